pub use super::achievement_role_badges::Entity as AchievementRoleBadges;
pub use super::achievement_role_groups::Entity as AchievementRoleGroups;
pub use super::achievement_roles::Entity as AchievementRoles;
pub use super::axis_versions::Entity as AxisVersions;
pub use super::capability_grants::Entity as CapabilityGrants;
pub use super::capability_roles::Entity as CapabilityRoles;
pub use super::completion_players::Entity as CompletionPlayers;
pub use super::completions::Entity as Completions;
pub use super::holder_snapshot::Entity as HolderSnapshot;
pub use super::holder_snapshot_meta::Entity as HolderSnapshotMeta;
pub use super::lcc_records::Entity as LccRecords;
pub use super::maps::Entity as Maps;
pub use super::player_capability_roles::Entity as PlayerCapabilityRoles;
pub use super::players::Entity as Players;
pub use super::remakes::Entity as Remakes;
pub use super::tuning_constant_sets::Entity as TuningConstantSets;
pub use super::tuning_constants::Entity as TuningConstants;
