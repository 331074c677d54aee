#![doc = "QuakeView: map layer and view-state coordination for earthquake-impact dashboards"]
mod chart;
mod classes;
mod config;
mod dashboard;
mod expr;
mod geojson;
mod registry;
mod session;
mod shell;
mod source;
mod surface;
mod sync;
mod view;

#[doc(inline)]
pub use registry::{FileRef, RegionEntry, Registry};

#[doc(inline)]
pub use classes::{SizeClass, SizeClasses};

#[doc(inline)]
pub use expr::{color_step, damage_color_match, population_ramp, size_color_step, size_filter, Expr};

#[doc(inline)]
pub use geojson::{footprint_area, BuildingSummary, CommuneStats, DamageState, GeoDocument};

#[doc(inline)]
pub use view::{Change, Intent, LayerName, LayerStore, LayerVisibility, OverlayName, OverlayPolicy, OverlayVisibility, Outcome, ViewState, Warning};

#[doc(inline)]
pub use surface::{Camera, LayerKind, LayerSpec, LoadedLayer, MapSurface, MapWidget, MemoryWidget, Slot, WidgetCall};

#[doc(inline)]
pub use sync::{FetchKind, FetchRequest, Hazard, SyncReport, SyncSettings, Synchronizer, Theme, Ticket};

#[doc(inline)]
pub use chart::{chart_kind, chart_records, chart_records_for_label, reference_lines, slice_color, sort_descending, ChartKind, ChartRecord, Metric, ReferenceLine};

#[doc(inline)]
pub use shell::{ChartPanel, LayerToggle, LegendEntry, Panels, RegionPicker, SizeFilterRow};

#[doc(inline)]
pub use config::{DashboardConfig, ViewConfig};

#[doc(inline)]
pub use dashboard::{Dashboard, DispatchReport};

#[doc(inline)]
pub use session::{Page, Session};

#[doc(inline)]
pub use source::{list_geojson, DiskSource, GeoSource, MemSource};
