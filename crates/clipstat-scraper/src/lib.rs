pub mod api;
pub mod count;
pub mod deep;
pub mod dom;
pub mod error;
pub mod followers;
pub mod graph;
pub mod host;
pub mod page;
pub mod profile;
pub mod retry;
pub mod state;
pub mod stats;
pub mod video;

pub use api::{deep_scan, scan, video_detail, EngineSettings, Envelope, ScanData, PRO_NOTE};
pub use count::{count_from_value, parse_abbreviated, parse_count, CountScale};
pub use deep::{clamp_limit, DeepScanConfig, DeepScanSummary, DeepScanner, FetchTabDriver};
pub use error::{ExtractError, ExtractFailure, HostError, Traced};
pub use graph::{find_video_node, score_node, GraphMatch, MatchKind, SearchOutcome};
pub use host::{ExecutionWorld, PageHost, StaticPageHost, TabDriver, TabId, TabStatus};
pub use page::{AnchorTile, PageError, PageSnapshot};
pub use profile::{extract_profile, scan_profile, ScanOptions, ScrollTiming};
pub use state::StateProbe;
pub use stats::{project_stats, CandidateShape, ProjectedStats};
pub use video::extract_video_detail;
