use serde::Serialize;

use super::MeasuredPost;
use crate::sample::{mean_of, round_to, Sampled};

/// Posts with metrics needed before bands are compared at all.
const MIN_BAND_POSTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditBand {
    /// Up to 3 edits.
    Low,
    /// 4 to 7 edits.
    Medium,
    /// 8 or more.
    High,
}

impl EditBand {
    pub const ALL: [EditBand; 3] = [EditBand::Low, EditBand::Medium, EditBand::High];

    #[must_use]
    pub fn for_edit_count(edits: u32) -> Self {
        match edits {
            0..=3 => EditBand::Low,
            4..=7 => EditBand::Medium,
            _ => EditBand::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandStats {
    pub band: EditBand,
    pub posts: usize,
    pub mean_engagement_rate: Option<f64>,
    pub rated_posts: usize,
    pub mean_reach: Option<f64>,
    pub reach_samples: usize,
}

/// Engagement and reach by how heavily the draft was edited.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn edit_bands(posts: &[MeasuredPost<'_>]) -> Sampled<Vec<BandStats>> {
    Sampled::gate(posts.len(), MIN_BAND_POSTS, || {
        EditBand::ALL
            .iter()
            .map(|band| {
                let members: Vec<&MeasuredPost<'_>> = posts
                    .iter()
                    .filter(|m| EditBand::for_edit_count(m.post.edit_count) == *band)
                    .collect();
                let engagement = mean_of(members.iter().filter_map(|m| m.rates.engagement_rate));
                let reach = mean_of(
                    members
                        .iter()
                        .filter_map(|m| m.snapshot.reach.map(|r| r as f64)),
                );
                BandStats {
                    band: *band,
                    posts: members.len(),
                    mean_engagement_rate: engagement.map(|(m, _)| round_to(m, 2)),
                    rated_posts: engagement.map_or(0, |(_, n)| n),
                    mean_reach: reach.map(|(m, _)| m.round()),
                    reach_samples: reach.map_or(0, |(_, n)| n),
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::aggregate::test_support::{fixture, Row};

    #[test]
    fn band_boundaries() {
        assert_eq!(EditBand::for_edit_count(0), EditBand::Low);
        assert_eq!(EditBand::for_edit_count(3), EditBand::Low);
        assert_eq!(EditBand::for_edit_count(4), EditBand::Medium);
        assert_eq!(EditBand::for_edit_count(7), EditBand::Medium);
        assert_eq!(EditBand::for_edit_count(8), EditBand::High);
    }

    #[test]
    fn needs_three_measured_posts() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let fx = fixture(&[Row::new(t, Some(1.0)), Row::new(t, Some(2.0))]);
        assert_eq!(
            edit_bands(&fx.measured()),
            Sampled::InsufficientData {
                observed: 2,
                required: 3
            }
        );
    }

    #[test]
    fn means_use_present_samples_only() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let fx = fixture(&[
            Row::new(t, Some(2.0)).edits(1),
            Row::new(t + Duration::days(1), Some(4.0)).edits(2),
            Row::new(t + Duration::days(2), None).edits(3).reach(4_000),
            Row::new(t + Duration::days(3), Some(1.0)).edits(9),
        ]);
        let measured = fx.measured();
        let bands = edit_bands(&measured);
        let bands = bands.value().unwrap();

        let low = &bands[0];
        assert_eq!(low.posts, 3);
        assert_eq!(low.rated_posts, 2);
        assert_eq!(low.mean_engagement_rate, Some(3.0));
        assert_eq!(low.mean_reach, Some(8_000.0));
        assert_eq!(low.reach_samples, 3);

        let medium = &bands[1];
        assert_eq!(medium.posts, 0);
        assert_eq!(medium.mean_engagement_rate, None);

        assert_eq!(bands[2].mean_engagement_rate, Some(1.0));
    }
}
