use crate::{
    error::ErrorKind,
    model::ResolvedPlace,
    projector::{CurrentView, DailyView, HourlyView},
};

/// Presentation surface driven by the dashboard controller.
///
/// Implemented once per UI technology. The controller only calls the `show_*`
/// view methods after every view for a cycle has been built.
pub trait Renderer: Send + Sync {
    fn show_current(&self, place: &ResolvedPlace, view: &CurrentView);

    fn show_hourly(&self, view: &HourlyView);

    fn show_daily(&self, view: &DailyView);

    fn show_not_found(&self, query: &str);

    fn show_error(&self, kind: ErrorKind);

    /// Busy indicator around a cycle.
    fn set_loading(&self, _active: bool) {}
}
