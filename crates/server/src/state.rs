use service::PrizeService;

/// Shared handler state: the prize service and the store it was built with.
#[derive(Clone)]
pub struct AppState {
    pub prizes: PrizeService,
}

impl AppState {
    pub fn new(prizes: PrizeService) -> Self {
        Self { prizes }
    }
}
