// linkvault services
// Services provide core functionality: tag heuristics, metadata fetching, file formats, quick capture, settings, sync.

pub mod formats;
pub mod html_meta;
pub mod metadata_fetcher;
pub mod quick_capture;
pub mod settings_engine;
pub mod sync_mirror;
pub mod tag_heuristics;
