use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceTab {
    Dashboard,
    Containers,
    Images,
    Volumes,
    BuildCache,
    Overlay2,
    Logs,
    BindMounts,
}

impl ResourceTab {
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Containers,
        Self::Images,
        Self::Volumes,
        Self::BuildCache,
        Self::Overlay2,
        Self::Logs,
        Self::BindMounts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Containers => "Containers",
            Self::Images => "Images",
            Self::Volumes => "Volumes",
            Self::BuildCache => "Build Cache",
            Self::Overlay2 => "Overlay2",
            Self::Logs => "Logs",
            Self::BindMounts => "Bind Mounts",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "dash" | "dashboard" | "home" | "summary" => Some(Self::Dashboard),
            "ct" | "container" | "containers" | "ps" => Some(Self::Containers),
            "img" | "image" | "images" => Some(Self::Images),
            "vol" | "volume" | "volumes" => Some(Self::Volumes),
            "cache" | "bc" | "build-cache" | "buildcache" | "builder" => Some(Self::BuildCache),
            "overlay" | "overlay2" | "layers" | "layer" => Some(Self::Overlay2),
            "log" | "logs" => Some(Self::Logs),
            "bind" | "binds" | "bind-mounts" | "bindmounts" | "mounts" => Some(Self::BindMounts),
            _ => None,
        }
    }

    pub fn short_token(self) -> &'static str {
        match self {
            Self::Dashboard => "dash",
            Self::Containers => "ct",
            Self::Images => "img",
            Self::Volumes => "vol",
            Self::BuildCache => "cache",
            Self::Overlay2 => "layers",
            Self::Logs => "logs",
            Self::BindMounts => "bind",
        }
    }

    /// Path of the backend route serving this page, relative to the API base.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Containers => "/containers",
            Self::Images => "/images",
            Self::Volumes => "/volumes",
            Self::BuildCache => "/build-cache",
            Self::Overlay2 => "/overlay2",
            Self::Logs => "/logs",
            Self::BindMounts => "/bind-mounts",
        }
    }

    pub fn is_dashboard(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl Display for ResourceTab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub created: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub id: String,
    pub repository: String,
    pub tag: String,
    pub created: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    #[serde(deserialize_with = "lenient_bytes")]
    pub virtual_size: u64,
    #[serde(deserialize_with = "lenient_bytes")]
    pub containers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VolumeInfo {
    pub name: String,
    pub driver: String,
    pub created: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    pub mount_point: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub containers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildCacheInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub cache_type: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    pub created: String,
    pub last_used: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub usage_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogInfo {
    pub container_id: String,
    pub container_name: String,
    pub image: String,
    pub log_path: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindMountInfo {
    pub source: String,
    pub destination: String,
    pub container_name: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    #[serde(rename = "type")]
    pub mount_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Overlay2Layer {
    pub id: String,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
    pub in_use: bool,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub docker_version: DockerVersion,
    pub disk_usage: DiskUsage,
    pub scan_status: ScanStatus,
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DockerVersion {
    pub version: String,
    pub api_version: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Platform {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiskUsage {
    #[serde(deserialize_with = "lenient_bytes")]
    pub used_bytes: u64,
    #[serde(deserialize_with = "lenient_bytes")]
    pub available_bytes: u64,
    #[serde(deserialize_with = "lenient_bytes")]
    pub total_bytes: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanStatus {
    pub is_scanning: bool,
    pub last_scan_time: Option<String>,
    /// Milliseconds.
    pub scan_duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    pub images: ResourceUsage,
    pub containers: ResourceUsage,
    pub volumes: ResourceUsage,
    pub build_cache: ResourceUsage,
    pub overlay2: ResourceUsage,
    pub logs: ResourceUsage,
    pub bind_mounts: ResourceUsage,
}

/// Per-category aggregate. The backend omits `count` for categories it only sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceUsage {
    #[serde(deserialize_with = "lenient_count")]
    pub count: Option<u64>,
    #[serde(deserialize_with = "lenient_bytes")]
    pub size: u64,
}

impl ResourceUsage {
    pub fn sized(size: u64) -> Self {
        Self { count: None, size }
    }

    pub fn counted(count: u64, size: u64) -> Self {
        Self {
            count: Some(count),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Dashboard(Box<DashboardData>),
    Containers(Vec<ContainerInfo>),
    Images(Vec<ImageInfo>),
    Volumes(Vec<VolumeInfo>),
    BuildCache(Vec<BuildCacheInfo>),
    Overlay2(Vec<Overlay2Layer>),
    Logs(Vec<LogInfo>),
    BindMounts(Vec<BindMountInfo>),
}

impl Payload {
    pub fn tab(&self) -> ResourceTab {
        match self {
            Self::Dashboard(_) => ResourceTab::Dashboard,
            Self::Containers(_) => ResourceTab::Containers,
            Self::Images(_) => ResourceTab::Images,
            Self::Volumes(_) => ResourceTab::Volumes,
            Self::BuildCache(_) => ResourceTab::BuildCache,
            Self::Overlay2(_) => ResourceTab::Overlay2,
            Self::Logs(_) => ResourceTab::Logs,
            Self::BindMounts(_) => ResourceTab::BindMounts,
        }
    }

    /// Decodes a response body for `tab`.
    pub fn from_json(tab: ResourceTab, body: Value) -> serde_json::Result<Self> {
        Ok(match tab {
            ResourceTab::Dashboard => Self::Dashboard(Box::new(serde_json::from_value(body)?)),
            ResourceTab::Containers => Self::Containers(serde_json::from_value(body)?),
            ResourceTab::Images => Self::Images(serde_json::from_value(body)?),
            ResourceTab::Volumes => Self::Volumes(serde_json::from_value(body)?),
            ResourceTab::BuildCache => Self::BuildCache(serde_json::from_value(body)?),
            ResourceTab::Overlay2 => Self::Overlay2(serde_json::from_value(body)?),
            ResourceTab::Logs => Self::Logs(serde_json::from_value(body)?),
            ResourceTab::BindMounts => Self::BindMounts(serde_json::from_value(body)?),
        })
    }

    pub fn record_count(&self) -> Option<usize> {
        match self {
            Self::Dashboard(_) => None,
            Self::Containers(items) => Some(items.len()),
            Self::Images(items) => Some(items.len()),
            Self::Volumes(items) => Some(items.len()),
            Self::BuildCache(items) => Some(items.len()),
            Self::Overlay2(items) => Some(items.len()),
            Self::Logs(items) => Some(items.len()),
            Self::BindMounts(items) => Some(items.len()),
        }
    }
}

// Docker reports -1 for sizes it has not computed; floats show up from some backends.
fn lenient_bytes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_to_u64(Option::<Value>::deserialize(deserializer)?).unwrap_or(0))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_to_u64(Option::<Value>::deserialize(deserializer)?))
}

fn number_to_u64(value: Option<Value>) -> Option<u64> {
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().map(|value| value.max(0.0) as u64)),
        _ => None,
    }
}
