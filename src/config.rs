use crate::domain::group::NewGroup;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A group definition file as read by the command line.
///
/// ```toml
/// [group]
/// name = "Arisan RT 05"
/// nominal = 100000
/// period = "bulanan"
/// total_members = 3
///
/// [group.mode]
/// mode = "menurun"
/// target = 300000
/// sub_period = 1
/// gaps = [50000]
///
/// [[group.members]]
/// name = "Siti"
///
/// [simulation]
/// seed = 7
/// draw = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub group: NewGroup,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Defaults for `arisan simulate`; command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    #[serde(default)]
    pub draw: bool,
}

impl GroupConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a group definition.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GroupConfig = toml::from_str(content)?;
        config.group.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group::{ContributionMode, PenaltyKind, Period, TurnMethod};
    use crate::domain::member::MemberRole;
    use crate::domain::money::Money;
    use crate::error::ArisanError;
    use rust_decimal_macros::dec;

    const DECLINING: &str = r#"
        [group]
        name = "Arisan RT 05"
        nominal = 100000
        period = "bulanan"
        total_members = 3
        turn_method = "undian"
        payment_deadline_day = 20
        disbursement_day = 25

        [group.mode]
        mode = "menurun"
        target = 300000
        sub_period = 1
        gaps = [50000]

        [group.settings.penalty]
        enabled = true
        kind = "fixed"
        amount = 10000

        [[group.members]]
        name = "Siti"
        role = "ketua"

        [[group.members]]
        name = "Budi"

        [simulation]
        seed = 7
    "#;

    #[test]
    fn test_parse_declining_group() {
        let config = GroupConfig::from_toml_str(DECLINING).unwrap();
        let group = config.group;

        assert_eq!(group.period, Period::Monthly);
        assert_eq!(group.turn_method, TurnMethod::Draw);
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.payment_deadline_day, Some(20));
        assert_eq!(group.disbursement_day, Some(25));
        assert_eq!(group.members[0].role, MemberRole::Chair);
        assert_eq!(group.settings.penalty.kind, PenaltyKind::Fixed);
        let ContributionMode::Declining(schedule) = group.mode else {
            panic!("expected a declining schedule");
        };
        assert_eq!(schedule.gaps, vec![Money::new(dec!(50000))]);
        assert_eq!(schedule.admin_fee, Money::ZERO);
        assert_eq!(config.simulation.seed, Some(7));
        assert!(!config.simulation.draw);
    }

    #[test]
    fn test_fixed_mode_is_default() {
        let config = GroupConfig::from_toml_str(
            r#"
            [group]
            name = "Arisan Kantor"
            nominal = 50000
            period = "weekly"
            total_members = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.group.mode, ContributionMode::Fixed);
        assert!(config.group.members.is_empty());
    }

    #[test]
    fn test_invalid_groups_are_rejected() {
        let too_small = r#"
            [group]
            name = "Solo"
            nominal = 50000
            period = "mingguan"
            total_members = 1
        "#;
        assert!(matches!(
            GroupConfig::from_toml_str(too_small),
            Err(ArisanError::ValidationError(_))
        ));

        let negative_penalty = r#"
            [group]
            name = "Arisan Kantor"
            nominal = 50000
            period = "mingguan"
            total_members = 4

            [group.settings.penalty]
            enabled = true
            kind = "percentage"
            amount = -5
        "#;
        assert!(matches!(
            GroupConfig::from_toml_str(negative_penalty),
            Err(ArisanError::ValidationError(_))
        ));

        assert!(matches!(
            GroupConfig::from_toml_str("[group]\nname = 3"),
            Err(ArisanError::ConfigError(_))
        ));
    }
}
