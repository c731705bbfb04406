//! Instance capability negotiation
//!
//! Checks requested extension and layer names against what the runtime
//! reports before an instance is created. Snapshots are fetched on every
//! call and never cached.

use std::collections::BTreeSet;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;

use ash::vk;

use crate::vulkan::VulkanResult;

/// Kind of named capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Instance or device extension
    Extension,
    /// Instance layer
    Layer,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => f.write_str("Extension"),
            Self::Layer => f.write_str("Layer"),
        }
    }
}

/// Names the runtime reported as present at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    names: BTreeSet<String>,
}

impl AvailabilitySnapshot {
    /// Build a snapshot from plain names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a snapshot from extension properties returned by the driver
    pub fn from_extension_properties(properties: &[vk::ExtensionProperties]) -> Self {
        Self::new(properties.iter().map(|p| fixed_name(&p.extension_name)))
    }

    /// Build a snapshot from layer properties returned by the driver
    pub fn from_layer_properties(properties: &[vk::LayerProperties]) -> Self {
        Self::new(properties.iter().map(|p| fixed_name(&p.layer_name)))
    }

    /// Exact, case-sensitive membership test
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the runtime reported nothing
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn fixed_name(raw: &[c_char]) -> String {
    #[allow(clippy::cast_sign_loss)]
    let bytes: Vec<u8> = raw.iter().map(|&c| c as u8).collect();
    // An unterminated array is taken whole
    CStr::from_bytes_until_nul(&bytes).map_or_else(
        |_| String::from_utf8_lossy(&bytes).into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Requested extension and layer names
///
/// Order only matters for diagnostics. Duplicates are kept and checked
/// individually.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    /// Required extension names
    pub extensions: Vec<String>,
    /// Required layer names
    pub layers: Vec<String>,
}

impl RequirementSet {
    /// Empty requirement set, trivially satisfied
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required extension
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Add required extensions
    pub fn with_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a required layer
    pub fn with_layer(mut self, name: impl Into<String>) -> Self {
        self.layers.push(name.into());
        self
    }
}

/// Something that can report which instance extensions and layers exist
pub trait CapabilitySource {
    /// Instance extensions currently available
    fn instance_extensions(&self) -> VulkanResult<AvailabilitySnapshot>;

    /// Instance layers currently available
    fn instance_layers(&self) -> VulkanResult<AvailabilitySnapshot>;
}

/// Decide whether every required extension and layer is available
///
/// Extensions are checked first; the first missing one ends the check and
/// the layer snapshot is never fetched. A failed runtime query counts as an
/// empty snapshot.
pub fn negotiate<S>(source: &S, requirements: &RequirementSet) -> bool
where
    S: CapabilitySource + ?Sized,
{
    let extensions = snapshot_or_empty(source.instance_extensions(), CapabilityKind::Extension);
    log_available("Instance", CapabilityKind::Extension, &extensions);
    if !all_present(&extensions, &requirements.extensions, CapabilityKind::Extension) {
        return false;
    }

    let layers = snapshot_or_empty(source.instance_layers(), CapabilityKind::Layer);
    log_available("Instance", CapabilityKind::Layer, &layers);
    all_present(&layers, &requirements.layers, CapabilityKind::Layer)
}

/// Check each required name against a snapshot, stopping at the first miss
pub fn all_present(
    snapshot: &AvailabilitySnapshot,
    required: &[String],
    kind: CapabilityKind,
) -> bool {
    check_each(snapshot, required, |name, supported| {
        if supported {
            log::debug!("{kind} {name} is supported");
        } else {
            log::debug!("{kind} {name} is not supported");
        }
    })
}

/// Report every required name in order, duplicates included, until one is missing
pub fn check_each<F>(snapshot: &AvailabilitySnapshot, required: &[String], mut report: F) -> bool
where
    F: FnMut(&str, bool),
{
    for name in required {
        let supported = snapshot.contains(name);
        report(name, supported);
        if !supported {
            return false;
        }
    }
    true
}

pub(crate) fn snapshot_or_empty(
    result: VulkanResult<AvailabilitySnapshot>,
    kind: CapabilityKind,
) -> AvailabilitySnapshot {
    result.unwrap_or_else(|e| {
        log::warn!("Failed to query available {kind}s: {e}");
        AvailabilitySnapshot::default()
    })
}

pub(crate) fn log_available(scope: &str, kind: CapabilityKind, snapshot: &AvailabilitySnapshot) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("{scope} can support the following {kind}s:");
    for name in snapshot.iter() {
        log::debug!("\t\"{name}\"");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vulkan::VulkanError;
    use std::cell::Cell;

    /// In-memory runtime that counts how often each snapshot is fetched
    struct FakeRuntime {
        extensions: Vec<&'static str>,
        layers: Vec<&'static str>,
        fail_extensions: bool,
        extension_queries: Cell<usize>,
        layer_queries: Cell<usize>,
    }

    impl FakeRuntime {
        fn new(extensions: &[&'static str], layers: &[&'static str]) -> Self {
            Self {
                extensions: extensions.to_vec(),
                layers: layers.to_vec(),
                fail_extensions: false,
                extension_queries: Cell::new(0),
                layer_queries: Cell::new(0),
            }
        }
    }

    impl CapabilitySource for FakeRuntime {
        fn instance_extensions(&self) -> VulkanResult<AvailabilitySnapshot> {
            self.extension_queries.set(self.extension_queries.get() + 1);
            if self.fail_extensions {
                return Err(VulkanError::Api(vk::Result::ERROR_INITIALIZATION_FAILED));
            }
            Ok(AvailabilitySnapshot::new(self.extensions.iter().copied()))
        }

        fn instance_layers(&self) -> VulkanResult<AvailabilitySnapshot> {
            self.layer_queries.set(self.layer_queries.get() + 1);
            Ok(AvailabilitySnapshot::new(self.layers.iter().copied()))
        }
    }

    #[test]
    fn test_subset_is_supported() {
        let runtime = FakeRuntime::new(&["VK_KHR_swapchain", "VK_KHR_maintenance1"], &[]);
        let requirements = RequirementSet::new().with_extension("VK_KHR_swapchain");
        assert!(negotiate(&runtime, &requirements));
    }

    #[test]
    fn test_missing_extension_fails() {
        let runtime = FakeRuntime::new(&["VK_KHR_swapchain"], &[]);
        let requirements = RequirementSet::new()
            .with_extension("VK_KHR_swapchain")
            .with_extension("VK_KHR_ray_tracing");
        assert!(!negotiate(&runtime, &requirements));
    }

    #[test]
    fn test_empty_requirements_always_pass() {
        let runtime = FakeRuntime::new(&[], &[]);
        assert!(negotiate(&runtime, &RequirementSet::new()));
    }

    #[test]
    fn test_missing_layer_fails() {
        let runtime = FakeRuntime::new(&["VK_EXT_debug_utils"], &["VK_LAYER_LUNARG_api_dump"]);
        let requirements = RequirementSet::new()
            .with_extension("VK_EXT_debug_utils")
            .with_layer("VK_LAYER_KHRONOS_validation");
        assert!(!negotiate(&runtime, &requirements));
        assert_eq!(runtime.layer_queries.get(), 1);
    }

    #[test]
    fn test_extension_miss_skips_layer_query() {
        let runtime = FakeRuntime::new(&[], &["VK_LAYER_KHRONOS_validation"]);
        let requirements = RequirementSet::new()
            .with_extension("VK_KHR_surface")
            .with_layer("VK_LAYER_KHRONOS_validation");
        assert!(!negotiate(&runtime, &requirements));
        assert_eq!(runtime.extension_queries.get(), 1);
        assert_eq!(runtime.layer_queries.get(), 0);
    }

    #[test]
    fn test_snapshots_fetched_every_call() {
        let runtime = FakeRuntime::new(&["VK_KHR_surface"], &[]);
        let requirements = RequirementSet::new().with_extension("VK_KHR_surface");
        assert!(negotiate(&runtime, &requirements));
        assert!(negotiate(&runtime, &requirements));
        assert_eq!(runtime.extension_queries.get(), 2);
        assert_eq!(runtime.layer_queries.get(), 2);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let runtime = FakeRuntime::new(&["VK_KHR_surface"], &[]);
        let requirements = RequirementSet::new().with_extension("vk_khr_surface");
        assert!(!negotiate(&runtime, &requirements));
    }

    #[test]
    fn test_duplicates_are_checked_individually() {
        let runtime = FakeRuntime::new(&["VK_KHR_surface"], &[]);
        let requirements = RequirementSet::new()
            .with_extension("VK_KHR_surface")
            .with_extension("VK_KHR_surface");
        assert!(negotiate(&runtime, &requirements));

        let snapshot = AvailabilitySnapshot::new(["VK_KHR_surface"]);
        let mut reports = Vec::new();
        let supported = check_each(&snapshot, &requirements.extensions, |name, ok| {
            reports.push((name.to_string(), ok));
        });
        assert!(supported);
        assert_eq!(
            reports,
            vec![
                ("VK_KHR_surface".to_string(), true),
                ("VK_KHR_surface".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_reports_stop_at_first_missing() {
        let snapshot = AvailabilitySnapshot::new(["VK_KHR_surface"]);
        let required: Vec<String> = ["VK_KHR_surface", "VK_KHR_display", "VK_KHR_surface"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let mut reports = Vec::new();
        assert!(!check_each(&snapshot, &required, |name, ok| {
            reports.push((name.to_string(), ok));
        }));
        assert_eq!(
            reports,
            vec![
                ("VK_KHR_surface".to_string(), true),
                ("VK_KHR_display".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_order_does_not_change_result() {
        let runtime = FakeRuntime::new(
            &["VK_KHR_surface", "VK_KHR_xcb_surface", "VK_EXT_debug_utils"],
            &["VK_LAYER_KHRONOS_validation", "VK_LAYER_MESA_overlay"],
        );
        let extensions = ["VK_KHR_surface", "VK_KHR_xcb_surface", "VK_EXT_debug_utils", "VK_KHR_display"];
        let layers = ["VK_LAYER_KHRONOS_validation", "VK_LAYER_MESA_overlay"];

        for missing in [true, false] {
            let mut exts: Vec<&str> = extensions.to_vec();
            if !missing {
                exts.pop();
            }
            let forward = RequirementSet::new()
                .with_extensions(exts.iter().copied())
                .with_layer(layers[0])
                .with_layer(layers[1]);
            let reversed = RequirementSet::new()
                .with_extensions(exts.iter().rev().copied())
                .with_layer(layers[1])
                .with_layer(layers[0]);
            assert_eq!(negotiate(&runtime, &forward), !missing);
            assert_eq!(negotiate(&runtime, &reversed), !missing);
        }
    }

    #[test]
    fn test_failed_query_behaves_like_empty_snapshot() {
        let mut runtime = FakeRuntime::new(&["VK_KHR_surface"], &[]);
        runtime.fail_extensions = true;
        assert!(!negotiate(&runtime, &RequirementSet::new().with_extension("VK_KHR_surface")));
        assert!(negotiate(&runtime, &RequirementSet::new()));
    }

    #[test]
    fn test_snapshot_from_driver_properties() {
        let mut property = vk::ExtensionProperties::default();
        for (dst, src) in property.extension_name.iter_mut().zip(b"VK_KHR_swapchain") {
            *dst = *src as c_char;
        }
        let snapshot = AvailabilitySnapshot::from_extension_properties(&[property]);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("VK_KHR_swapchain"));
    }

    #[test]
    fn test_unterminated_name_stays_in_bounds() {
        let mut property = vk::LayerProperties::default();
        for dst in &mut property.layer_name {
            *dst = b'A' as c_char;
        }
        let snapshot = AvailabilitySnapshot::from_layer_properties(&[property]);
        let name = snapshot.iter().next().unwrap();
        assert_eq!(name.len(), vk::MAX_EXTENSION_NAME_SIZE);
        assert!(name.bytes().all(|b| b == b'A'));
    }
}
