//! Language compliance evaluation
//!
//! Pure set-containment check shared by every backend client. A file
//! complies with a profile when every required language appears among
//! the observed ones; audio and subtitles are evaluated independently.

/// True iff every element of `required` is present in `observed`.
///
/// An empty `required` set is trivially satisfied, including by an
/// empty `observed` set.
pub fn satisfies(observed: &[String], required: &[String]) -> bool {
    required
        .iter()
        .all(|lang| observed.iter().any(|have| have == lang))
}
