//! The point formulas of both kinds of formats.

use entity::types::ExpertTier;

use crate::constants::TuningConstants;

/// The flags of the qualifying completions of a player on a map, in a format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFlags {
    /// At least one completion is black-border.
    pub black_border: bool,
    /// At least one completion was done without the optimal hero.
    pub no_optimal_hero: bool,
    /// A single completion carries both flags.
    pub both_on_one: bool,
    /// At least one completion is the current least-cost completion of the map.
    pub current_lcc: bool,
}

impl GroupFlags {
    /// Folds the flags of a completion into the group.
    pub fn observe(&mut self, black_border: bool, no_optimal_hero: bool, current_lcc: bool) {
        self.black_border |= black_border;
        self.no_optimal_hero |= no_optimal_hero;
        self.both_on_one |= black_border && no_optimal_hero;
        self.current_lcc |= current_lcc;
    }
}

/// Returns the raw points of the map at the provided rank of a list of `count` maps.
///
/// The first map is worth the top points, and the last one the bottom points.
pub fn list_points(rank: i32, count: i32, constants: &TuningConstants) -> f64 {
    let top = constants.points_top_map;
    let bottom = constants.points_bottom_map;

    if count <= 1 {
        return top;
    }

    let idx = rank as f64;
    let n = count as f64;
    let exponent = (1. + (1. - idx) / (n - 1.)).powf(constants.formula_slope);
    bottom * (top / bottom).powf(exponent)
}

/// Returns the bonus multiplier of a group of completions on a list map.
///
/// Both flags on a single completion multiply their factors. Flags observed on separate
/// completions add them.
pub fn list_multiplier(flags: GroupFlags, constants: &TuningConstants) -> f64 {
    let bb = constants.points_multi_bb;
    let opt_hero = constants.points_multi_opt_hero;

    if flags.both_on_one {
        return bb * opt_hero;
    }

    match (flags.black_border, flags.no_optimal_hero) {
        (false, false) => 1.,
        (true, false) => bb,
        (false, true) => opt_hero,
        (true, true) => bb + opt_hero,
    }
}

/// Returns the points of a group of completions on a list map.
///
/// `raw` must already be rounded to the configured precision.
pub fn list_group_points(raw: f64, flags: GroupFlags, constants: &TuningConstants) -> f64 {
    let lcc = if flags.current_lcc {
        constants.points_extra_lcc
    } else {
        0.
    };
    raw * list_multiplier(flags, constants) + lcc
}

/// Returns the base points of an expert map of the provided tier.
pub fn expert_points(tier: ExpertTier, constants: &TuningConstants) -> f64 {
    constants.exp_points[tier.index()]
}

/// Returns the points of a group of completions on an expert map.
///
/// The base points are rounded to the configured precision before the bonuses apply.
pub fn expert_group_points(
    tier: ExpertTier,
    flags: GroupFlags,
    constants: &TuningConstants,
) -> f64 {
    let base = round_to(expert_points(tier, constants), constants.decimal_digits);
    let mut points = base;

    if flags.no_optimal_hero {
        points += constants.exp_no_opt_hero_points[tier.index()];
    }
    if flags.black_border {
        points += base * (constants.exp_bb_multi - 1.);
    }
    if flags.current_lcc {
        points += constants.exp_lcc_extra;
    }

    points
}

/// Rounds the value to the provided amount of decimal digits.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use entity::types::ExpertTier;

    use super::{
        GroupFlags, expert_group_points, list_group_points, list_multiplier, list_points,
        round_to,
    };
    use crate::constants::TuningConstants;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn list_bounds() {
        let c = TuningConstants::default();
        assert!(close(list_points(1, 50, &c), 100.));
        assert!(close(list_points(50, 50, &c), 5.));
        assert!(close(list_points(1, 1, &c), 100.));

        let mut previous = f64::INFINITY;
        for rank in 1..=50 {
            let points = list_points(rank, 50, &c);
            assert!(points < previous);
            previous = points;
        }
    }

    #[test]
    fn rank_5_of_50() {
        let c = TuningConstants::default();
        let expected = 5. * 20f64.powf((1f64 + (1. - 5.) / 49.).powf(0.88));
        assert!(close(list_points(5, 50, &c), expected));
        assert_eq!(round_to(list_points(5, 50, &c), 2), 80.55);
    }

    #[test]
    fn bonus_precedence() {
        let c = TuningConstants::default();

        let mut separate = GroupFlags::default();
        separate.observe(true, false, false);
        separate.observe(false, true, false);
        assert!(close(list_multiplier(separate, &c), 3. + 2.));

        let mut together = GroupFlags::default();
        together.observe(true, true, false);
        assert!(close(list_multiplier(together, &c), 3. * 2.));

        let mut bb = GroupFlags::default();
        bb.observe(true, false, false);
        assert!(close(list_multiplier(bb, &c), 3.));

        assert!(close(list_multiplier(GroupFlags::default(), &c), 1.));
    }

    #[test]
    fn lcc_bonus_is_flat() {
        let c = TuningConstants::default();
        let mut flags = GroupFlags::default();
        flags.observe(true, false, true);
        assert!(close(list_group_points(10., flags, &c), 10. * 3. + 20.));
    }

    #[test]
    fn expert_bonuses() {
        let c = TuningConstants::default();
        let plain = GroupFlags::default();
        assert!(close(expert_group_points(ExpertTier::True, plain, &c), 4.));

        let mut all = GroupFlags::default();
        all.observe(true, false, false);
        all.observe(false, true, true);
        // 4 base, +2 no optimal hero, +4 * (2 - 1) black border, +1 lcc
        assert!(close(expert_group_points(ExpertTier::True, all, &c), 11.));
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(77.4649, 0), 77.);
        assert_eq!(round_to(77.4649, 2), 77.46);
        assert_eq!(round_to(2.5, 0), 3.);
    }
}
