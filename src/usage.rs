use crate::model::{DashboardSummary, ResourceTab, ResourceUsage};

#[derive(Debug, Clone, PartialEq)]
pub struct UsageShare {
    pub label: &'static str,
    pub tab: ResourceTab,
    pub count: Option<u64>,
    pub bytes: u64,
    pub percent: u64,
}

pub fn categories(summary: &DashboardSummary) -> [(&'static str, ResourceTab, ResourceUsage); 7] {
    [
        ("Images", ResourceTab::Images, summary.images),
        ("Containers", ResourceTab::Containers, summary.containers),
        ("Volumes", ResourceTab::Volumes, summary.volumes),
        ("Build Cache", ResourceTab::BuildCache, summary.build_cache),
        ("Overlay2", ResourceTab::Overlay2, summary.overlay2),
        ("Logs", ResourceTab::Logs, summary.logs),
        ("Bind Mounts", ResourceTab::BindMounts, summary.bind_mounts),
    ]
}

/// Non-empty categories, largest first, each with its rounded share of the total.
pub fn usage_breakdown(summary: &DashboardSummary) -> Vec<UsageShare> {
    let mut present = categories(summary)
        .into_iter()
        .filter(|(_, _, usage)| usage.size > 0)
        .collect::<Vec<_>>();
    present.sort_by(|left, right| right.2.size.cmp(&left.2.size));

    let total = present.iter().map(|(_, _, usage)| usage.size).sum::<u64>();
    present
        .into_iter()
        .map(|(label, tab, usage)| UsageShare {
            label,
            tab,
            count: usage.count,
            bytes: usage.size,
            percent: percent_of(usage.size, total),
        })
        .collect()
}

pub fn total_bytes(summary: &DashboardSummary) -> u64 {
    categories(summary)
        .iter()
        .map(|(_, _, usage)| usage.size)
        .sum()
}

pub fn percent_of(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u64
}

/// Splits `width` cells across `sizes` proportionally (largest remainder).
///
/// Widths sum to exactly `width` whenever any size is non-zero, and every
/// non-zero size gets at least one cell as long as there are enough cells.
pub fn proportional_widths(sizes: &[u64], width: u16) -> Vec<u16> {
    let total = sizes.iter().map(|size| *size as u128).sum::<u128>();
    if total == 0 || width == 0 {
        return vec![0; sizes.len()];
    }

    let width = width as u128;
    let mut widths = Vec::with_capacity(sizes.len());
    let mut remainders = Vec::with_capacity(sizes.len());
    for (index, size) in sizes.iter().enumerate() {
        let scaled = *size as u128 * width;
        widths.push(scaled / total);
        remainders.push((scaled % total, index));
    }

    let assigned = widths.iter().sum::<u128>();
    remainders.sort_by(|left, right| right.0.cmp(&left.0).then(left.1.cmp(&right.1)));
    for (_, index) in remainders.iter().take((width - assigned) as usize) {
        widths[*index] += 1;
    }

    // Give starved slices a cell, taken from the widest slice.
    let nonzero = sizes.iter().filter(|size| **size > 0).count() as u128;
    if nonzero <= width {
        for index in 0..sizes.len() {
            if sizes[index] == 0 || widths[index] > 0 {
                continue;
            }
            let donor = (0..widths.len())
                .filter(|candidate| widths[*candidate] > 1)
                .max_by_key(|candidate| widths[*candidate]);
            if let Some(donor) = donor {
                widths[donor] -= 1;
                widths[index] += 1;
            }
        }
    }

    widths.into_iter().map(|cells| cells as u16).collect()
}

/// Maps a rank (0 = largest) onto a palette so the largest slice is darkest.
pub fn shade_index(rank: usize, count: usize, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let last = palette_len - 1;
    if count <= 1 {
        return last;
    }
    let scaled = rank.min(count - 1) * last / (count - 1);
    last - scaled
}

#[cfg(test)]
mod tests {
    use super::{percent_of, proportional_widths, shade_index, total_bytes, usage_breakdown};
    use crate::model::{DashboardSummary, ResourceTab, ResourceUsage};

    fn summary() -> DashboardSummary {
        DashboardSummary {
            images: ResourceUsage::counted(12, 15_500_000_000),
            containers: ResourceUsage::counted(8, 8_200_000_000),
            volumes: ResourceUsage::counted(15, 12_300_000_000),
            build_cache: ResourceUsage::counted(25, 5_800_000_000),
            overlay2: ResourceUsage::sized(2_100_000_000),
            logs: ResourceUsage::sized(0),
            bind_mounts: ResourceUsage::sized(250_000_000),
        }
    }

    #[test]
    fn breakdown_drops_empty_and_sorts_descending() {
        let shares = usage_breakdown(&summary());
        let labels = shares.iter().map(|share| share.label).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "Images",
                "Volumes",
                "Containers",
                "Build Cache",
                "Overlay2",
                "Bind Mounts"
            ]
        );
        assert_eq!(shares[0].tab, ResourceTab::Images);
        assert_eq!(shares[0].count, Some(12));
        assert_eq!(shares[4].count, None);
        assert_eq!(shares[0].percent, 35);
    }

    #[test]
    fn totals_and_percentages() {
        assert_eq!(total_bytes(&summary()), 44_150_000_000);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(5, 0), 0);
    }

    #[test]
    fn widths_fill_the_bar_exactly() {
        let widths = proportional_widths(&[50, 30, 20], 10);
        assert_eq!(widths, vec![5, 3, 2]);

        let widths = proportional_widths(&[1, 1, 1], 10);
        assert_eq!(widths.iter().sum::<u16>(), 10);
        assert_eq!(widths, vec![4, 3, 3]);
    }

    #[test]
    fn tiny_slices_still_get_a_cell() {
        let widths = proportional_widths(&[1_000_000, 1, 1], 20);
        assert_eq!(widths.iter().sum::<u16>(), 20);
        assert!(widths.iter().all(|cells| *cells >= 1));
        assert_eq!(widths[0], 18);
    }

    #[test]
    fn empty_sizes_produce_empty_widths() {
        assert_eq!(proportional_widths(&[0, 0], 10), vec![0, 0]);
        assert_eq!(proportional_widths(&[5, 5], 0), vec![0, 0]);
    }

    #[test]
    fn largest_rank_gets_darkest_shade() {
        assert_eq!(shade_index(0, 5, 10), 9);
        assert_eq!(shade_index(4, 5, 10), 0);
        assert_eq!(shade_index(0, 1, 10), 9);
        assert_eq!(shade_index(2, 5, 10), 5);
    }
}
