//! Bundled sample data with the same shapes as the disk usage API.

use crate::model::{
    BindMountInfo, BuildCacheInfo, ContainerInfo, DashboardData, DashboardSummary, DiskUsage,
    DockerVersion, ImageInfo, LogInfo, Overlay2Layer, Payload, Platform, ResourceTab,
    ResourceUsage, ScanStatus, VolumeInfo,
};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::sync::Mutex;

const SCAN_DURATION_MS: f64 = 12_500.0;

#[derive(Debug, Clone, PartialEq)]
struct ScanState {
    last_scan_time: DateTime<Utc>,
    scan_duration_ms: f64,
    completed_scans: u32,
}

#[derive(Debug)]
pub struct MockData {
    scan: Mutex<ScanState>,
}

impl MockData {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            scan: Mutex::new(ScanState {
                last_scan_time: now - TimeDelta::minutes(5),
                scan_duration_ms: SCAN_DURATION_MS,
                completed_scans: 0,
            }),
        }
    }

    pub fn payload(&self, tab: ResourceTab, now: DateTime<Utc>) -> Payload {
        match tab {
            ResourceTab::Dashboard => Payload::Dashboard(Box::new(self.dashboard())),
            ResourceTab::Containers => Payload::Containers(containers(now)),
            ResourceTab::Images => Payload::Images(images(now)),
            ResourceTab::Volumes => Payload::Volumes(volumes(now)),
            ResourceTab::BuildCache => Payload::BuildCache(build_cache(now)),
            ResourceTab::Overlay2 => Payload::Overlay2(overlay2_layers()),
            ResourceTab::Logs => Payload::Logs(logs(now)),
            ResourceTab::BindMounts => Payload::BindMounts(bind_mounts()),
        }
    }

    /// Records a finished scan; the next dashboard payload reports it.
    pub fn record_scan(&self, now: DateTime<Utc>) {
        let mut scan = match self.scan.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        scan.completed_scans = scan.completed_scans.saturating_add(1);
        scan.last_scan_time = now;
        // 5s..17s, cycling per scan.
        scan.scan_duration_ms = 5_000.0 + f64::from(scan.completed_scans % 7) * 2_000.0;
    }

    fn dashboard(&self) -> DashboardData {
        let scan = match self.scan.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        DashboardData {
            docker_version: DockerVersion {
                version: "24.0.7".to_string(),
                api_version: "1.43".to_string(),
                platform: Platform {
                    name: "Docker Desktop 4.25.0 (128006)".to_string(),
                },
            },
            disk_usage: DiskUsage {
                used_bytes: 45_000_000_000,
                available_bytes: 155_000_000_000,
                total_bytes: 200_000_000_000,
                used_percent: 22.5,
            },
            scan_status: ScanStatus {
                is_scanning: false,
                last_scan_time: Some(iso(scan.last_scan_time)),
                scan_duration: Some(scan.scan_duration_ms),
            },
            summary: DashboardSummary {
                images: ResourceUsage::counted(12, 15_500_000_000),
                containers: ResourceUsage::counted(8, 8_200_000_000),
                volumes: ResourceUsage::counted(15, 12_300_000_000),
                build_cache: ResourceUsage::counted(25, 5_800_000_000),
                overlay2: ResourceUsage::sized(2_100_000_000),
                logs: ResourceUsage::sized(850_000_000),
                bind_mounts: ResourceUsage::sized(250_000_000),
            },
        }
    }
}

fn iso(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn hours_ago(now: DateTime<Utc>, hours: i64) -> String {
    iso(now - TimeDelta::hours(hours))
}

fn days_ago(now: DateTime<Utc>, days: i64) -> String {
    iso(now - TimeDelta::days(days))
}

fn containers(now: DateTime<Utc>) -> Vec<ContainerInfo> {
    let rows: [(&str, &str, &str, i64, u64, &[&str]); 3] = [
        ("c1a2b3c4d5e6", "nginx-web", "nginx:latest", 24, 1_200_000_000, &["80:8080", "443:8443"]),
        ("f7g8h9i0j1k2", "postgres-db", "postgres:15", 48, 2_800_000_000, &["5432:5432"]),
        ("l3m4n5o6p7q8", "redis-cache", "redis:7-alpine", 12, 450_000_000, &["6379:6379"]),
    ];
    rows.into_iter()
        .map(|(id, name, image, age_hours, size, ports)| ContainerInfo {
            id: id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            status: "running".to_string(),
            created: hours_ago(now, age_hours),
            size,
            ports: ports.iter().map(|port| port.to_string()).collect(),
        })
        .collect()
}

fn images(now: DateTime<Utc>) -> Vec<ImageInfo> {
    [
        ("sha256:abc123def456", "nginx", "latest", 7, 1_400_000_000, 1),
        ("sha256:ghi789jkl012", "postgres", "15", 10, 3_200_000_000, 1),
        ("sha256:mno345pqr678", "redis", "7-alpine", 3, 280_000_000, 1),
        ("sha256:def456ghi789", "node", "18-alpine", 5, 850_000_000, 2),
        ("sha256:jkl012mno345", "python", "3.11-slim", 12, 650_000_000, 0),
        ("sha256:pqr678stu901", "mongo", "6.0", 20, 2_100_000_000, 1),
        ("sha256:vwx234yzz567", "alpine", "3.18", 2, 45_000_000, 3),
        ("sha256:abc890def123", "ubuntu", "22.04", 15, 280_000_000, 0),
        ("sha256:ghi456jkl789", "traefik", "v3.0", 8, 410_000_000, 1),
        ("sha256:mno012pqr345", "mysql", "8.0", 25, 1_850_000_000, 0),
        ("sha256:stu678vwx901", "elasticsearch", "8.11.0", 18, 3_800_000_000, 0),
        ("sha256:yza234bcd567", "golang", "1.21-alpine", 6, 320_000_000, 0),
    ]
    .into_iter()
    .map(|(id, repository, tag, age_days, size, containers)| ImageInfo {
        id: id.to_string(),
        repository: repository.to_string(),
        tag: tag.to_string(),
        created: days_ago(now, age_days),
        size,
        virtual_size: size,
        containers,
    })
    .collect()
}

fn volumes(now: DateTime<Utc>) -> Vec<VolumeInfo> {
    [
        ("postgres_data", 30, 8_500_000_000, 1),
        ("nginx_config", 15, 125_000, 1),
    ]
    .into_iter()
    .map(|(name, age_days, size, containers)| VolumeInfo {
        name: name.to_string(),
        driver: "local".to_string(),
        created: days_ago(now, age_days),
        size,
        mount_point: format!("/var/lib/docker/volumes/{name}/_data"),
        containers,
    })
    .collect()
}

fn build_cache(now: DateTime<Utc>) -> Vec<BuildCacheInfo> {
    [
        ("cache123abc", "regular", 2_100_000_000, 2, 4, 15),
        ("cache456def", "inline", 850_000_000, 5, 8, 8),
        ("cache789ghi", "regular", 1_300_000_000, 9, 20, 22),
        ("cacheabc012", "frontend", 320_000_000, 12, 72, 5),
        ("cachedef345", "regular", 640_000_000, 3, 30, 18),
        ("cacheghi678", "inline", 90_000_000, 20, 240, 3),
    ]
    .into_iter()
    .map(
        |(id, cache_type, size, created_days, last_used_hours, usage_count)| BuildCacheInfo {
            id: id.to_string(),
            cache_type: cache_type.to_string(),
            size,
            created: days_ago(now, created_days),
            last_used: hours_ago(now, last_used_hours),
            usage_count,
        },
    )
    .collect()
}

fn logs(now: DateTime<Utc>) -> Vec<LogInfo> {
    [
        ("c1a2b3c4d5e6", "nginx-web", "nginx:latest", 45_000_000, 24),
        ("f7g8h9i0j1k2", "postgres-db", "postgres:15", 125_000_000, 48),
        ("l3m4n5o6p7q8", "redis-cache", "redis:7-alpine", 15_000_000, 12),
        ("n9o0p1q2r3s4", "api-server", "node:18-alpine", 85_000_000, 6 * 24),
        ("t5u6v7w8x9y0", "mongo-db", "mongo:6.0", 200_000_000, 10 * 24),
        ("z1a2b3c4d5e6", "frontend-dev", "node:18-alpine", 35_000_000, 4),
        ("f7g8h9i0j1k3", "worker-queue", "python:3.11-slim", 150_000_000, 18 * 24),
        ("m5n6o7p8q9r0", "elasticsearch", "elasticsearch:8.11.0", 500_000_000, 25 * 24),
    ]
    .into_iter()
    .map(|(id, name, image, size, age_hours)| LogInfo {
        container_id: id.to_string(),
        container_name: name.to_string(),
        image: image.to_string(),
        log_path: format!("/var/lib/docker/containers/{id}/{id}-json.log"),
        size,
        created: hours_ago(now, age_hours),
    })
    .collect()
}

fn bind_mounts() -> Vec<BindMountInfo> {
    [
        ("/home/user/app", "/app", "nginx-web", 125_000_000),
        ("/home/user/data", "/data", "postgres-db", 85_000_000),
    ]
    .into_iter()
    .map(|(source, destination, container, size)| BindMountInfo {
        source: source.to_string(),
        destination: destination.to_string(),
        container_name: container.to_string(),
        size,
        mount_type: "bind".to_string(),
    })
    .collect()
}

fn overlay2_layers() -> Vec<Overlay2Layer> {
    [
        ("3f1c9a7b2e4d", 1_150_000_000, true),
        ("8b2d4e6f1a3c", 640_000_000, true),
        ("c4e6a8b0d2f1", 210_000_000, false),
        ("1a3c5e7b9d0f", 100_000_000, false),
    ]
    .into_iter()
    .map(|(id, size, in_use)| Overlay2Layer {
        id: id.to_string(),
        size,
        in_use,
        path: format!("/var/lib/docker/overlay2/{id}"),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::MockData;
    use crate::engine::Query;
    use crate::format::parse_timestamp;
    use crate::model::{Payload, ResourceTab};
    use crate::resources::table_view;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn every_tab_has_sample_data() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let data = MockData::new(now);
        for tab in ResourceTab::ALL {
            assert_eq!(data.payload(tab, now).tab(), tab);
        }
    }

    #[test]
    fn sized_only_categories_omit_counts() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let Payload::Dashboard(dashboard) = MockData::new(now).payload(ResourceTab::Dashboard, now)
        else {
            panic!("expected dashboard payload");
        };
        assert_eq!(dashboard.summary.images.count, Some(12));
        assert_eq!(dashboard.summary.overlay2.count, None);
        assert_eq!(dashboard.summary.logs.count, None);
        assert_eq!(dashboard.summary.bind_mounts.count, None);
    }

    #[test]
    fn recorded_scan_shows_on_next_dashboard() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let data = MockData::new(now);
        let later = now + TimeDelta::minutes(30);
        data.record_scan(later);

        let Payload::Dashboard(dashboard) = data.payload(ResourceTab::Dashboard, later) else {
            panic!("expected dashboard payload");
        };
        let scanned_at = dashboard
            .scan_status
            .last_scan_time
            .as_deref()
            .and_then(parse_timestamp);
        assert_eq!(scanned_at, Some(later));
        assert_eq!(dashboard.scan_status.scan_duration, Some(7_000.0));
    }

    #[test]
    fn sample_cache_has_three_frequent_entries() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let payload = MockData::new(now).payload(ResourceTab::BuildCache, now);
        let view = table_view(&payload, &Query::new(now)).unwrap();
        let frequent = view
            .filter_tabs
            .iter()
            .find(|tab| tab.id == "frequent")
            .map(|tab| tab.count);
        assert_eq!(frequent, Some(3));
    }
}
