use crate::engine::{
    ALL_FILTER, FieldKind, FieldValue, NamedFilter, Query, Record, ResourceConfig,
    SortDirection, SortField, SortSpec, compute_view_lenient,
};
use crate::format::{format_byte_size, format_timestamp_age, is_within, parse_timestamp};
use crate::model::{
    BindMountInfo, BuildCacheInfo, ContainerInfo, ImageInfo, LogInfo, Overlay2Layer, Payload,
    ResourceTab, VolumeInfo,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeSet;

pub const LARGE_VOLUME_BYTES: u64 = 5_000_000_000;
pub const LARGE_CACHE_BYTES: u64 = 1_000_000_000;
pub const LARGE_LOG_BYTES: u64 = 100_000_000;
pub const LARGE_BIND_MOUNT_BYTES: u64 = 500_000_000;
pub const FREQUENT_CACHE_USES: u64 = 10;
const MAX_PATH_CHARS: usize = 48;

fn recent_window() -> TimeDelta {
    TimeDelta::days(1)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub sort_field: Option<&'static str>,
}

const fn column(title: &'static str, sort_field: Option<&'static str>) -> Column {
    Column { title, sort_field }
}

/// A record that knows how to render itself as a table row.
pub trait TableRecord: Record {
    const COLUMNS: &'static [Column];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String>;

    fn size_bytes(&self) -> u64;
}

fn text(value: &str) -> Option<FieldValue<'_>> {
    Some(FieldValue::Text(value))
}

fn number(value: u64) -> Option<FieldValue<'static>> {
    Some(FieldValue::Number(value))
}

fn timestamp(raw: &str) -> Option<FieldValue<'static>> {
    Some(FieldValue::Timestamp(parse_timestamp(raw)))
}

fn sort_field(id: &'static str, label: &'static str, kind: FieldKind) -> SortField {
    SortField { id, label, kind }
}

fn size_descending() -> SortSpec {
    SortSpec::new("size", SortDirection::Descending)
}

impl Record for ContainerInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => text(&self.id),
            "name" => text(&self.name),
            "image" => text(&self.image),
            "status" => text(&self.status),
            "created" => timestamp(&self.created),
            "size" => number(self.size),
            _ => None,
        }
    }
}

impl TableRecord for ContainerInfo {
    const COLUMNS: &'static [Column] = &[
        column("NAME", Some("name")),
        column("IMAGE", Some("image")),
        column("STATUS", Some("status")),
        column("PORTS", None),
        column("SIZE", Some("size")),
        column("CREATED", Some("created")),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.image.clone(),
            self.status.clone(),
            published_ports(&self.ports),
            format_byte_size(self.size),
            format_timestamp_age(&self.created, now),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

// Docker lists every published port again as an IPv6 (`:::`) binding.
fn published_ports(ports: &[String]) -> String {
    let shown = ports
        .iter()
        .map(String::as_str)
        .filter(|port| !port.starts_with(":::"))
        .collect::<Vec<_>>();
    if shown.is_empty() {
        "-".to_string()
    } else {
        shown.join(", ")
    }
}

fn is_running(container: &ContainerInfo) -> bool {
    container.status.eq_ignore_ascii_case("running")
}

pub fn containers_config() -> ResourceConfig<ContainerInfo> {
    ResourceConfig {
        searchable: vec!["name", "image"],
        filters: vec![
            NamedFilter {
                id: "running",
                label: "Running",
                predicate: |container, _| is_running(container),
            },
            NamedFilter {
                id: "stopped",
                label: "Stopped",
                predicate: |container, _| !is_running(container),
            },
        ],
        sort_fields: vec![
            sort_field("name", "Name", FieldKind::Text),
            sort_field("image", "Image", FieldKind::Text),
            sort_field("status", "Status", FieldKind::Text),
            sort_field("created", "Created", FieldKind::Timestamp),
            sort_field("size", "Size", FieldKind::Number),
        ],
        default_sort: size_descending(),
    }
}

impl Record for ImageInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => text(&self.id),
            "repository" => text(&self.repository),
            "tag" => text(&self.tag),
            "created" => timestamp(&self.created),
            "size" => number(self.size),
            "virtual_size" => number(self.virtual_size),
            "containers" => number(self.containers),
            _ => None,
        }
    }
}

impl TableRecord for ImageInfo {
    const COLUMNS: &'static [Column] = &[
        column("REPOSITORY", Some("repository")),
        column("TAG", Some("tag")),
        column("IMAGE ID", None),
        column("SIZE", Some("size")),
        column("VIRTUAL", Some("virtual_size")),
        column("CONTAINERS", Some("containers")),
        column("CREATED", Some("created")),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.repository.clone(),
            self.tag.clone(),
            short_image_id(&self.id),
            format_byte_size(self.size),
            format_byte_size(self.virtual_size),
            self.containers.to_string(),
            format_timestamp_age(&self.created, now),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn images_config() -> ResourceConfig<ImageInfo> {
    ResourceConfig {
        searchable: vec!["repository", "tag", "id"],
        filters: vec![
            NamedFilter {
                id: "in-use",
                label: "In Use",
                predicate: |image, _| image.containers > 0,
            },
            NamedFilter {
                id: "unused",
                label: "Unused",
                predicate: |image, _| image.containers == 0,
            },
        ],
        sort_fields: vec![
            sort_field("repository", "Repository", FieldKind::Text),
            sort_field("tag", "Tag", FieldKind::Text),
            sort_field("created", "Created", FieldKind::Timestamp),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("virtual_size", "Virtual Size", FieldKind::Number),
            sort_field("containers", "Containers", FieldKind::Number),
        ],
        default_sort: size_descending(),
    }
}

impl Record for VolumeInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => text(&self.name),
            "driver" => text(&self.driver),
            "mount_point" => text(&self.mount_point),
            "created" => timestamp(&self.created),
            "size" => number(self.size),
            "containers" => number(self.containers),
            _ => None,
        }
    }
}

impl TableRecord for VolumeInfo {
    const COLUMNS: &'static [Column] = &[
        column("NAME", Some("name")),
        column("DRIVER", Some("driver")),
        column("MOUNT POINT", None),
        column("SIZE", Some("size")),
        column("CONTAINERS", Some("containers")),
        column("CREATED", Some("created")),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.driver.clone(),
            truncate_path(&self.mount_point, MAX_PATH_CHARS),
            format_byte_size(self.size),
            self.containers.to_string(),
            format_timestamp_age(&self.created, now),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn volumes_config() -> ResourceConfig<VolumeInfo> {
    ResourceConfig {
        searchable: vec!["name", "driver", "mount_point"],
        filters: vec![
            NamedFilter {
                id: "in-use",
                label: "In Use",
                predicate: |volume, _| volume.containers > 0,
            },
            NamedFilter {
                id: "unused",
                label: "Unused",
                predicate: |volume, _| volume.containers == 0,
            },
            NamedFilter {
                id: "large",
                label: "Large",
                predicate: |volume, _| volume.size > LARGE_VOLUME_BYTES,
            },
        ],
        sort_fields: vec![
            sort_field("name", "Name", FieldKind::Text),
            sort_field("driver", "Driver", FieldKind::Text),
            sort_field("created", "Created", FieldKind::Timestamp),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("containers", "Containers", FieldKind::Number),
        ],
        default_sort: size_descending(),
    }
}

impl Record for BuildCacheInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => text(&self.id),
            "type" => text(&self.cache_type),
            "size" => number(self.size),
            "usage_count" => number(self.usage_count),
            "created" => timestamp(&self.created),
            "last_used" => timestamp(&self.last_used),
            _ => None,
        }
    }
}

impl TableRecord for BuildCacheInfo {
    const COLUMNS: &'static [Column] = &[
        column("ID", Some("id")),
        column("TYPE", Some("type")),
        column("SIZE", Some("size")),
        column("USES", Some("usage_count")),
        column("CREATED", Some("created")),
        column("LAST USED", Some("last_used")),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.id.clone(),
            self.cache_type.clone(),
            format_byte_size(self.size),
            self.usage_count.to_string(),
            format_timestamp_age(&self.created, now),
            format_timestamp_age(&self.last_used, now),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn build_cache_config() -> ResourceConfig<BuildCacheInfo> {
    ResourceConfig {
        searchable: vec!["id", "type"],
        filters: vec![
            NamedFilter {
                id: "recent",
                label: "Recent",
                predicate: |entry, as_of| is_within(&entry.last_used, recent_window(), as_of),
            },
            NamedFilter {
                id: "large",
                label: "Large",
                predicate: |entry, _| entry.size > LARGE_CACHE_BYTES,
            },
            NamedFilter {
                id: "frequent",
                label: "Frequent",
                predicate: |entry, _| entry.usage_count > FREQUENT_CACHE_USES,
            },
        ],
        sort_fields: vec![
            sort_field("id", "ID", FieldKind::Text),
            sort_field("type", "Type", FieldKind::Text),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("usage_count", "Usage", FieldKind::Number),
            sort_field("created", "Created", FieldKind::Timestamp),
            sort_field("last_used", "Last Used", FieldKind::Timestamp),
        ],
        default_sort: size_descending(),
    }
}

impl Record for LogInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "container_id" => text(&self.container_id),
            "container_name" => text(&self.container_name),
            "image" => text(&self.image),
            "log_path" => text(&self.log_path),
            "size" => number(self.size),
            "created" => timestamp(&self.created),
            _ => None,
        }
    }
}

impl TableRecord for LogInfo {
    const COLUMNS: &'static [Column] = &[
        column("CONTAINER", Some("container_name")),
        column("IMAGE", Some("image")),
        column("LOG PATH", None),
        column("SIZE", Some("size")),
        column("CREATED", Some("created")),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.container_name.clone(),
            if self.image.is_empty() {
                "-".to_string()
            } else {
                self.image.clone()
            },
            truncate_path(&self.log_path, MAX_PATH_CHARS),
            format_byte_size(self.size),
            format_timestamp_age(&self.created, now),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn logs_config() -> ResourceConfig<LogInfo> {
    ResourceConfig {
        searchable: vec!["container_name", "image"],
        filters: vec![
            NamedFilter {
                id: "large",
                label: "Large",
                predicate: |log, _| log.size > LARGE_LOG_BYTES,
            },
            NamedFilter {
                id: "recent",
                label: "Recent",
                predicate: |log, as_of| is_within(&log.created, recent_window(), as_of),
            },
        ],
        sort_fields: vec![
            sort_field("container_name", "Container", FieldKind::Text),
            sort_field("image", "Image", FieldKind::Text),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("created", "Created", FieldKind::Timestamp),
        ],
        default_sort: size_descending(),
    }
}

impl Record for BindMountInfo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "source" => text(&self.source),
            "destination" => text(&self.destination),
            "container_name" => text(&self.container_name),
            "type" => text(&self.mount_type),
            "size" => number(self.size),
            _ => None,
        }
    }
}

impl TableRecord for BindMountInfo {
    const COLUMNS: &'static [Column] = &[
        column("SOURCE", Some("source")),
        column("DESTINATION", Some("destination")),
        column("CONTAINER", Some("container_name")),
        column("TYPE", Some("type")),
        column("SIZE", Some("size")),
    ];

    fn cells(&self, _now: DateTime<Utc>) -> Vec<String> {
        vec![
            truncate_path(&self.source, MAX_PATH_CHARS),
            truncate_path(&self.destination, MAX_PATH_CHARS),
            self.container_name.clone(),
            self.mount_type.clone(),
            format_byte_size(self.size),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn bind_mounts_config() -> ResourceConfig<BindMountInfo> {
    ResourceConfig {
        searchable: vec!["container_name", "source", "destination"],
        filters: vec![NamedFilter {
            id: "large",
            label: "Large",
            predicate: |mount, _| mount.size > LARGE_BIND_MOUNT_BYTES,
        }],
        sort_fields: vec![
            sort_field("source", "Source", FieldKind::Text),
            sort_field("destination", "Destination", FieldKind::Text),
            sort_field("container_name", "Container", FieldKind::Text),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("type", "Type", FieldKind::Text),
        ],
        default_sort: size_descending(),
    }
}

impl Record for Overlay2Layer {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => text(&self.id),
            "path" => text(&self.path),
            "size" => number(self.size),
            "in_use" => Some(FieldValue::Flag(self.in_use)),
            _ => None,
        }
    }
}

impl TableRecord for Overlay2Layer {
    const COLUMNS: &'static [Column] = &[
        column("LAYER", Some("id")),
        column("IN USE", Some("in_use")),
        column("PATH", None),
        column("SIZE", Some("size")),
    ];

    fn cells(&self, _now: DateTime<Utc>) -> Vec<String> {
        vec![
            short_image_id(&self.id),
            if self.in_use { "yes" } else { "no" }.to_string(),
            truncate_path(&self.path, MAX_PATH_CHARS),
            format_byte_size(self.size),
        ]
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }
}

pub fn overlay2_config() -> ResourceConfig<Overlay2Layer> {
    ResourceConfig {
        searchable: vec!["id", "path"],
        filters: vec![
            NamedFilter {
                id: "in-use",
                label: "In Use",
                predicate: |layer, _| layer.in_use,
            },
            NamedFilter {
                id: "unused",
                label: "Unused",
                predicate: |layer, _| !layer.in_use,
            },
        ],
        sort_fields: vec![
            sort_field("id", "Layer", FieldKind::Text),
            sort_field("size", "Size", FieldKind::Number),
            sort_field("in_use", "In Use", FieldKind::Flag),
        ],
        default_sort: size_descending(),
    }
}

/// Filters and sort fields a page offers, independent of whether data has loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub filters: Vec<(&'static str, &'static str)>,
    pub sort_fields: Vec<SortField>,
    pub default_sort: SortSpec,
}

fn describe<R>(config: &ResourceConfig<R>) -> QueryOptions {
    QueryOptions {
        filters: config
            .filter_ids()
            .into_iter()
            .map(|id| (id, config.filter_label(id)))
            .collect(),
        sort_fields: config.sort_fields.clone(),
        default_sort: config.default_sort.clone(),
    }
}

impl QueryOptions {
    pub fn for_tab(tab: ResourceTab) -> Option<Self> {
        Some(match tab {
            ResourceTab::Dashboard => return None,
            ResourceTab::Containers => describe(&containers_config()),
            ResourceTab::Images => describe(&images_config()),
            ResourceTab::Volumes => describe(&volumes_config()),
            ResourceTab::BuildCache => describe(&build_cache_config()),
            ResourceTab::Overlay2 => describe(&overlay2_config()),
            ResourceTab::Logs => describe(&logs_config()),
            ResourceTab::BindMounts => describe(&bind_mounts_config()),
        })
    }

    pub fn has_filter(&self, id: &str) -> bool {
        self.filters.iter().any(|(candidate, _)| *candidate == id)
    }

    pub fn has_sort_field(&self, id: &str) -> bool {
        self.sort_fields.iter().any(|field| field.id == id)
    }

    pub fn filter_ids(&self) -> Vec<&'static str> {
        self.filters.iter().map(|(id, _)| *id).collect()
    }

    pub fn sort_field_ids(&self) -> Vec<&'static str> {
        self.sort_fields.iter().map(|field| field.id).collect()
    }

    pub fn filter_label(&self, id: &str) -> &'static str {
        self.filters
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, label)| *label)
            .unwrap_or("All")
    }

    pub fn sort_label(&self, id: &str) -> &'static str {
        self.sort_fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.label)
            .unwrap_or("Size")
    }

    /// Steps through the filters in display order, wrapping at both ends.
    pub fn cycle_filter(&self, current: &str, step: isize) -> &'static str {
        if self.filters.is_empty() {
            return ALL_FILTER;
        }
        let position = self
            .filters
            .iter()
            .position(|(id, _)| *id == current)
            .unwrap_or(0) as isize;
        let len = self.filters.len() as isize;
        self.filters[(position + step).rem_euclid(len) as usize].0
    }

    /// Advances to the next sortable field. A new field starts in its natural
    /// direction: descending for numbers, ascending for everything else.
    pub fn cycle_sort(&self, current: Option<&SortSpec>) -> SortSpec {
        let current_id = current
            .map(|spec| spec.field.as_str())
            .unwrap_or(self.default_sort.field.as_str());
        let position = self
            .sort_fields
            .iter()
            .position(|field| field.id == current_id)
            .map(|index| index + 1)
            .unwrap_or(0);
        match self.sort_fields.get(position % self.sort_fields.len().max(1)) {
            Some(field) => SortSpec::new(field.id, natural_direction(field.kind)),
            None => self.default_sort.clone(),
        }
    }
}

/// Numbers read best largest first; everything else alphabetically or oldest first.
pub fn natural_direction(kind: FieldKind) -> SortDirection {
    match kind {
        FieldKind::Number => SortDirection::Descending,
        _ => SortDirection::Ascending,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterTab {
    pub id: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

/// A rendered page: string cells plus the summary the filter tabs need.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub filter_tabs: Vec<FilterTab>,
    pub total: usize,
    pub visible_size: u64,
    pub sort: SortSpec,
    pub distinct_containers: Option<usize>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sort_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.sort_field == Some(self.sort.field.as_str()))
    }
}

fn build_view<R: TableRecord>(
    records: &[R],
    query: &Query,
    config: &ResourceConfig<R>,
) -> TableView {
    let view = compute_view_lenient(Some(records), query, config);
    let filter_tabs = config
        .filter_ids()
        .into_iter()
        .map(|id| FilterTab {
            id,
            label: config.filter_label(id),
            count: view.summary.count(id),
            active: id == query.filter,
        })
        .collect();

    TableView {
        columns: R::COLUMNS.to_vec(),
        rows: view.rows.iter().map(|record| record.cells(query.as_of)).collect(),
        filter_tabs,
        total: view.summary.total,
        visible_size: view.rows.iter().map(|record| record.size_bytes()).sum(),
        sort: view.sort,
        distinct_containers: None,
    }
}

/// Renders a list payload through its resource configuration.
pub fn table_view(payload: &Payload, query: &Query) -> Option<TableView> {
    let view = match payload {
        Payload::Dashboard(_) => return None,
        Payload::Containers(items) => build_view(items, query, &containers_config()),
        Payload::Images(items) => build_view(items, query, &images_config()),
        Payload::Volumes(items) => build_view(items, query, &volumes_config()),
        Payload::BuildCache(items) => build_view(items, query, &build_cache_config()),
        Payload::Overlay2(items) => build_view(items, query, &overlay2_config()),
        Payload::Logs(items) => build_view(items, query, &logs_config()),
        Payload::BindMounts(items) => {
            let mut view = build_view(items, query, &bind_mounts_config());
            view.distinct_containers = Some(distinct_containers(items));
            view
        }
    };
    Some(view)
}

fn distinct_containers(mounts: &[BindMountInfo]) -> usize {
    mounts
        .iter()
        .map(|mount| mount.container_name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Keeps the tail of long paths, which is the part that identifies them.
pub fn truncate_path(path: &str, max_chars: usize) -> String {
    let count = path.chars().count();
    if count <= max_chars || max_chars <= 3 {
        return path.to_string();
    }
    let tail = path
        .chars()
        .skip(count - (max_chars - 3))
        .collect::<String>();
    format!("...{tail}")
}

fn short_image_id(id: &str) -> String {
    let trimmed = id.strip_prefix("sha256:").unwrap_or(id);
    trimmed.chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        LARGE_BIND_MOUNT_BYTES, QueryOptions, TableRecord, bind_mounts_config, build_cache_config,
        containers_config, images_config, logs_config, overlay2_config, table_view,
        truncate_path, volumes_config,
    };
    use crate::engine::{Query, SortDirection, SortSpec, compute_view};
    use crate::model::{
        BindMountInfo, BuildCacheInfo, ContainerInfo, Overlay2Layer, Payload, ResourceTab,
        VolumeInfo,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn container(name: &str, size: u64, status: &str) -> ContainerInfo {
        ContainerInfo {
            id: format!("id-{name}"),
            name: name.to_string(),
            image: format!("{name}:latest"),
            status: status.to_string(),
            created: "2024-05-30T12:00:00Z".to_string(),
            size,
            ports: Vec::new(),
        }
    }

    fn cache(id: &str, usage_count: u64, last_used: &str) -> BuildCacheInfo {
        BuildCacheInfo {
            id: id.to_string(),
            cache_type: "regular".to_string(),
            size: 100,
            created: "2024-05-01T00:00:00Z".to_string(),
            last_used: last_used.to_string(),
            usage_count,
        }
    }

    #[test]
    fn every_resource_config_is_consistent() {
        assert!(containers_config().validate().is_ok());
        assert!(images_config().validate().is_ok());
        assert!(volumes_config().validate().is_ok());
        assert!(build_cache_config().validate().is_ok());
        assert!(logs_config().validate().is_ok());
        assert!(bind_mounts_config().validate().is_ok());
        assert!(overlay2_config().validate().is_ok());
    }

    #[test]
    fn containers_default_to_largest_first() {
        let records = vec![
            container("nginx-web", 1_200_000_000, "running"),
            container("postgres-db", 2_800_000_000, "running"),
            container("redis-cache", 450_000_000, "running"),
        ];
        let view = compute_view(Some(&records), &Query::new(now()), &containers_config()).unwrap();
        let order = view.rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["postgres-db", "nginx-web", "redis-cache"]);
        assert_eq!(view.summary.total, 3);
    }

    #[test]
    fn explicit_size_descending_matches_default() {
        let records = vec![
            container("nginx-web", 1_200_000_000, "running"),
            container("postgres-db", 2_800_000_000, "running"),
            container("redis-cache", 450_000_000, "exited"),
        ];
        let mut query = Query::new(now());
        query.sort = Some(SortSpec::new("size", SortDirection::Descending));
        let view = compute_view(Some(&records), &query, &containers_config()).unwrap();
        let sizes = view.rows.iter().map(|row| row.size).collect::<Vec<_>>();
        assert_eq!(sizes, vec![2_800_000_000, 1_200_000_000, 450_000_000]);
        assert_eq!(view.summary.count("running"), 2);
        assert_eq!(view.summary.count("stopped"), 1);
    }

    #[test]
    fn frequent_cache_count_ignores_search() {
        let records = [15, 8, 22, 5, 18, 3]
            .into_iter()
            .enumerate()
            .map(|(index, uses)| cache(&format!("cache{index}"), uses, "2024-06-01T08:00:00Z"))
            .collect::<Vec<_>>();

        for term in ["", "cache1", "nothing-matches"] {
            let mut query = Query::new(now());
            query.search = term.to_string();
            query.filter = "frequent".to_string();
            let view = compute_view(Some(&records), &query, &build_cache_config()).unwrap();
            assert_eq!(view.summary.count("frequent"), 3, "term {term:?}");
        }
    }

    #[test]
    fn recent_cache_filter_uses_query_instant() {
        let records = vec![
            cache("fresh", 1, "2024-06-01T08:00:00Z"),
            cache("stale", 1, "2024-05-29T08:00:00Z"),
            cache("unknown", 1, ""),
        ];
        let mut query = Query::new(now());
        query.filter = "recent".to_string();
        let view = compute_view(Some(&records), &query, &build_cache_config()).unwrap();
        let ids = view.rows.iter().map(|row| row.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn large_volume_threshold_is_exclusive() {
        let records = vec![
            VolumeInfo {
                name: "edge".to_string(),
                size: 5_000_000_000,
                ..VolumeInfo::default()
            },
            VolumeInfo {
                name: "big".to_string(),
                size: 8_500_000_000,
                containers: 1,
                ..VolumeInfo::default()
            },
        ];
        let view = compute_view(Some(&records), &Query::new(now()), &volumes_config()).unwrap();
        assert_eq!(view.summary.count("large"), 1);
        assert_eq!(view.summary.count("in-use"), 1);
        assert_eq!(view.summary.count("unused"), 1);
    }

    #[test]
    fn table_view_marks_active_filter_and_sort_column() {
        let payload = Payload::Containers(vec![
            container("web", 10, "running"),
            container("job", 20, "exited"),
        ]);
        let mut query = Query::new(now());
        query.filter = "running".to_string();
        let view = table_view(&payload, &query).unwrap();

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0][0], "web");
        assert_eq!(view.total, 2);
        assert_eq!(view.visible_size, 10);
        let active = view
            .filter_tabs
            .iter()
            .find(|tab| tab.active)
            .map(|tab| (tab.id, tab.count));
        assert_eq!(active, Some(("running", 1)));
        assert_eq!(view.filter_tabs[0].count, 2);
        assert_eq!(view.sort_column(), Some(4));
    }

    #[test]
    fn ports_cell_hides_ipv6_duplicates() {
        let mut web = container("web", 10, "running");
        web.ports = vec![
            "0.0.0.0:8080->80/tcp".to_string(),
            ":::8080->80/tcp".to_string(),
        ];
        assert_eq!(web.cells(now())[3], "0.0.0.0:8080->80/tcp");

        web.ports = vec![":::8080->80/tcp".to_string()];
        assert_eq!(web.cells(now())[3], "-");
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let payload = Payload::Overlay2(vec![Overlay2Layer {
            id: "layer".to_string(),
            size: 4,
            in_use: true,
            path: "/var/lib/docker/overlay2/layer".to_string(),
        }]);
        let mut query = Query::new(now());
        query.filter = "unused".to_string();
        let view = table_view(&payload, &query).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total, 1);
    }

    #[test]
    fn bind_mount_view_counts_distinct_containers() {
        let mount = |container: &str, size: u64| BindMountInfo {
            source: format!("/home/user/{container}"),
            destination: "/data".to_string(),
            container_name: container.to_string(),
            size,
            mount_type: "bind".to_string(),
        };
        let payload = Payload::BindMounts(vec![
            mount("web", LARGE_BIND_MOUNT_BYTES + 1),
            mount("web", 10),
            mount("db", 20),
        ]);
        let view = table_view(&payload, &Query::new(now())).unwrap();
        assert_eq!(view.distinct_containers, Some(2));
        assert_eq!(view.filter_tabs[1].count, 1);
    }

    #[test]
    fn dashboard_payload_has_no_table() {
        let payload = Payload::Dashboard(Box::default());
        assert!(table_view(&payload, &Query::new(now())).is_none());
        assert!(QueryOptions::for_tab(ResourceTab::Dashboard).is_none());
    }

    #[test]
    fn query_options_cycle_filters_and_sorts() {
        let options = QueryOptions::for_tab(ResourceTab::BuildCache).unwrap();
        assert_eq!(
            options.filter_ids(),
            vec!["all", "recent", "large", "frequent"]
        );
        assert_eq!(options.cycle_filter("all", 1), "recent");
        assert_eq!(options.cycle_filter("all", -1), "frequent");
        assert!(options.has_sort_field("last_used"));
        assert!(!options.has_filter("running"));

        let next = options.cycle_sort(None);
        assert_eq!(next, SortSpec::new("usage_count", SortDirection::Descending));
        let after = options.cycle_sort(Some(&SortSpec::new(
            "last_used",
            SortDirection::Ascending,
        )));
        assert_eq!(after, SortSpec::new("id", SortDirection::Ascending));
    }

    #[test]
    fn long_paths_keep_their_tail() {
        let path = "/var/lib/docker/containers/abcdef/abcdef-json.log";
        let truncated = truncate_path(path, 20);
        assert_eq!(truncated.chars().count(), 20);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("abcdef-json.log"));
        assert_eq!(truncate_path("/app", 20), "/app");
    }
}
