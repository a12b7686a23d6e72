use serde::{Deserialize, Serialize};

use crate::error::PasswordHashError;
use crate::hasher::{Hash, Hasher, Version, DEFAULT_COST, MAX_COST, MIN_COST};

/// Hashing parameters as they appear in an application's configuration.
///
/// Every field is optional when deserializing; missing fields take the values from
/// [`HashPolicy::default()`]. Values read from configuration aren't trusted: call
/// [`HashPolicy::validate()`] (or [`HashPolicy::hasher()`], which validates) before use.
///
/// ```rust
/// use bcrypt_hasher::HashPolicy;
///
/// let policy: HashPolicy = serde_json::from_str(r#"{ "cost": 12, "min_cost": 11 }"#).unwrap();
/// policy.validate().unwrap();
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashPolicy {
    /// The cost new hashes are generated with
    pub cost: u32,

    /// Hashes with a cost lower than this are considered stale and should be regenerated the
    /// next time the password is verified
    pub min_cost: u32,

    /// The revision prefix new hashes are written with
    pub version: Version,
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
            min_cost: DEFAULT_COST,
            version: Version::TwoB,
        }
    }
}

impl HashPolicy {
    /// Checks that both costs are in the range bcrypt accepts and that new hashes would not
    /// immediately be considered stale.
    pub fn validate(&self) -> Result<(), PasswordHashError> {
        for cost in [self.cost, self.min_cost] {
            if !(MIN_COST..=MAX_COST).contains(&cost) {
                return Err(PasswordHashError::InvalidCost(cost));
            }
        }

        if self.cost < self.min_cost {
            return Err(PasswordHashError::InvalidPolicy(
                "cost must not be lower than min_cost",
            ));
        }

        Ok(())
    }

    /// Validates the policy and returns a [`Hasher`] configured with it.
    pub fn hasher(&self) -> Result<Hasher, PasswordHashError> {
        self.validate()?;

        Ok(Hasher::new().cost(self.cost).version(self.version))
    }

    /// Checks whether a stored hash was generated with a cost below `min_cost`.
    pub fn needs_rehash(&self, hash: &Hash) -> bool {
        hash.needs_rehash(self.min_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    #[test]
    fn test_default_policy() {
        let policy = HashPolicy::default();

        assert_eq!(policy.cost, DEFAULT_COST);
        assert_eq!(policy.min_cost, DEFAULT_COST);
        assert_eq!(policy.version, Version::TwoB);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_deserialize_policy() {
        let policy: HashPolicy =
            serde_json::from_str(r#"{ "cost": 12, "min_cost": 11, "version": "2y" }"#).unwrap();

        assert_eq!(
            policy,
            HashPolicy {
                cost: 12,
                min_cost: 11,
                version: Version::TwoY,
            }
        );

        let policy: HashPolicy = serde_json::from_str(r#"{ "cost": 11 }"#).unwrap();

        assert_eq!(policy.cost, 11);
        assert_eq!(policy.min_cost, DEFAULT_COST);
        assert_eq!(policy.version, Version::TwoB);

        let policy: HashPolicy = serde_json::from_str("{}").unwrap();

        assert_eq!(policy, HashPolicy::default());
    }

    #[test]
    fn test_deserialize_invalid_policy() {
        assert!(serde_json::from_str::<HashPolicy>(r#"{ "version": "2c" }"#).is_err());
        assert!(serde_json::from_str::<HashPolicy>(r#"{ "rounds": 10 }"#).is_err());
        assert!(serde_json::from_str::<HashPolicy>(r#"{ "cost": -1 }"#).is_err());
    }

    #[test]
    fn test_serialize_policy() {
        let json = serde_json::to_value(HashPolicy::default()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "cost": 10, "min_cost": 10, "version": "2b" })
        );
    }

    #[test]
    fn test_validate_policy() {
        let policy = HashPolicy {
            cost: 32,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(PasswordHashError::InvalidCost(32))
        ));

        let policy = HashPolicy {
            min_cost: 3,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(PasswordHashError::InvalidCost(3))
        ));

        let policy = HashPolicy {
            cost: 10,
            min_cost: 12,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(PasswordHashError::InvalidPolicy(_))
        ));
        assert!(policy.hasher().is_err());
    }

    #[test]
    fn test_policy_hasher() {
        let policy = HashPolicy {
            cost: 5,
            min_cost: 4,
            version: Version::TwoA,
        };

        let hash = policy.hasher().unwrap().hash("@Pa$$20rd-Test").unwrap();

        assert_eq!(hash.cost(), 5);
        assert_eq!(hash.version(), Version::TwoA);
        assert!(!policy.needs_rehash(&hash));
        assert!(hash.verify("@Pa$$20rd-Test"));
    }

    #[test]
    fn test_policy_needs_rehash() {
        let stale = Hash::from_str("$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW")
            .unwrap();

        assert!(HashPolicy::default().needs_rehash(&stale));
        assert!(!HashPolicy {
            cost: 5,
            min_cost: 5,
            ..Default::default()
        }
        .needs_rehash(&stale));
    }
}
