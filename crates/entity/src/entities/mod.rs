pub mod prelude;

pub mod achievement_role_badges;
pub mod achievement_role_groups;
pub mod achievement_roles;
pub mod axis_versions;
pub mod capability_grants;
pub mod capability_roles;
pub mod completion_players;
pub mod completions;
pub mod holder_snapshot;
pub mod holder_snapshot_meta;
pub mod lcc_records;
pub mod maps;
pub mod player_capability_roles;
pub mod players;
pub mod remakes;
pub mod tuning_constant_sets;
pub mod tuning_constants;
