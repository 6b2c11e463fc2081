use crate::domain::method::MethodSig;
use crate::domain::type_ref::{MatchOptions, types_match_with};

/// Returns true when `candidate` occupies the same dispatch slot as `method`.
///
/// The candidate must be virtual, carry the same name (ordinal comparison), and its return and
/// parameter types must match `method`'s positionally. Generic parameters on the candidate's
/// side act as wildcards (see [`types_match_with`]).
pub fn signatures_match(candidate: &MethodSig, method: &MethodSig, options: &MatchOptions) -> bool {
    if !candidate.is_virtual {
        return false;
    }

    if candidate.name != method.name {
        return false;
    }

    if !types_match_with(&candidate.return_type, &method.return_type, options) {
        return false;
    }

    if candidate.parameters.len() != method.parameters.len() {
        return false;
    }

    candidate
        .parameters
        .iter()
        .zip(&method.parameters)
        .all(|(c, m)| types_match_with(c, m, options))
}
