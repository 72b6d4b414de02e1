use uuid::Uuid;

use transit_core::{TransitError, TransitResult};
use transit_shared::models::Passenger;

/// Legacy clients identify the occupant with either a `user_id` or a bare
/// `is_guest` flag. Both or neither is rejected here so engines only ever see
/// a well-formed [`Passenger`].
pub fn resolve_passenger(user_id: Option<Uuid>, is_guest: Option<bool>) -> TransitResult<Passenger> {
    match (user_id, is_guest.unwrap_or(false)) {
        (Some(_), true) => Err(TransitError::Validation(
            "provide either user_id or is_guest, not both".into(),
        )),
        (Some(user_id), false) => Ok(Passenger::Registered { user_id }),
        (None, true) => Ok(Passenger::Guest),
        (None, false) => Err(TransitError::Validation(
            "either user_id or is_guest is required".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passenger_field_combinations() {
        let user = Uuid::new_v4();
        assert_eq!(
            resolve_passenger(Some(user), None).unwrap(),
            Passenger::Registered { user_id: user }
        );
        assert_eq!(
            resolve_passenger(None, Some(true)).unwrap(),
            Passenger::Guest
        );
        assert!(matches!(
            resolve_passenger(Some(user), Some(true)),
            Err(TransitError::Validation(_))
        ));
        assert!(matches!(
            resolve_passenger(None, None),
            Err(TransitError::Validation(_))
        ));
        assert!(matches!(
            resolve_passenger(None, Some(false)),
            Err(TransitError::Validation(_))
        ));
    }
}
