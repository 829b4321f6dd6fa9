//! Map location picker: tap to pick a point, long-press-drag to select an area.
//!
//! [`MapPicker`] is the actor. It owns the [`GestureMachine`], the one armed
//! long-press timer, and the one reverse-geocode lookup in flight. The host
//! feeds it pointer input through a
//! [`PickerClient`](crate::clients::PickerClient) and renders the
//! [`PickerEvent`]s it emits.

pub mod error;
pub mod geo;
pub mod gesture;

pub use error::*;
pub use geo::*;
pub use gesture::*;

use crate::api::ReverseGeocoder;
use crate::clients::PickerClient;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, warn};

/// Messages accepted by the picker actor.
#[derive(Debug)]
pub enum PickerRequest {
    Input(PointerInput),
    SetEditing(bool),
    State(oneshot::Sender<GestureState>),
}

/// What the host should render or commit to its form.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// Whether the map may pan. Leaving edit mode mid-gesture emits nothing:
    /// the host owns panning in read-only mode and must restore it itself.
    PanningChanged(bool),
    MarkerPlaced(LatLng),
    AreaPreview(LatLngBounds),
    AreaCleared,
    PointSelected(PointSelection),
    AreaSelected(AreaSelection),
}

impl PickerEvent {
    /// The committed selection this event carries, if it is one.
    pub fn selection(&self) -> Option<MapSelection> {
        match self {
            PickerEvent::PointSelected(point) => Some(MapSelection::Point(point.clone())),
            PickerEvent::AreaSelected(area) => Some(MapSelection::Area(*area)),
            _ => None,
        }
    }
}

struct ArmedTimer {
    id: TimerId,
    sleep: Pin<Box<Sleep>>,
}

pub struct MapPicker {
    receiver: mpsc::Receiver<PickerRequest>,
    machine: GestureMachine,
    timer: Option<ArmedTimer>,
    geocoder: Arc<dyn ReverseGeocoder>,
    lookup: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<PickerEvent>,
}

/// Creates a picker actor, its client, and the event stream the host listens on.
pub fn new(
    editing: bool,
    long_press: Duration,
    geocoder: Arc<dyn ReverseGeocoder>,
) -> (MapPicker, PickerClient, mpsc::UnboundedReceiver<PickerEvent>) {
    let (sender, receiver) = mpsc::channel(64);
    let (events, event_stream) = mpsc::unbounded_channel();
    let picker = MapPicker {
        receiver,
        machine: GestureMachine::new(editing, long_press),
        timer: None,
        geocoder,
        lookup: None,
        events,
    };
    (picker, PickerClient::new(sender), event_stream)
}

impl MapPicker {
    pub async fn run(mut self) {
        info!(editing = self.machine.is_editing(), "Map picker started");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg),
                    None => break,
                },
                fired = expired(&mut self.timer) => {
                    self.timer = None;
                    debug!(timer = ?fired, "Long press elapsed");
                    self.apply(PointerInput::LongPressElapsed(fired));
                }
            }
        }

        self.abandon_lookup();
        info!("Map picker stopped");
    }

    fn handle(&mut self, msg: PickerRequest) {
        match msg {
            PickerRequest::Input(input) => self.apply(input),
            PickerRequest::SetEditing(editing) => {
                info!(editing, "Editing mode changed");
                let effects = self.machine.set_editing(editing);
                if !editing {
                    self.abandon_lookup();
                }
                self.execute(effects);
            }
            PickerRequest::State(respond_to) => {
                let _ = respond_to.send(self.machine.state());
            }
        }
    }

    fn apply(&mut self, input: PointerInput) {
        let effects = self.machine.handle(input);
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTimer { id, after } => {
                    self.abandon_lookup();
                    self.timer = Some(ArmedTimer { id, sleep: Box::pin(sleep(after)) });
                }
                Effect::CancelTimer(id) => {
                    if self.timer.as_ref().is_some_and(|timer| timer.id == id) {
                        self.timer = None;
                    }
                }
                Effect::SetPanning(enabled) => self.emit(PickerEvent::PanningChanged(enabled)),
                Effect::ClearArea => self.emit(PickerEvent::AreaCleared),
                Effect::PreviewArea(bounds) => self.emit(PickerEvent::AreaPreview(bounds)),
                Effect::SelectArea(area) => {
                    info!(start = ?area.start, end = ?area.end, "Area selected");
                    self.emit(PickerEvent::AreaSelected(area));
                }
                Effect::PickPoint(at) => {
                    self.emit(PickerEvent::MarkerPlaced(at));
                    self.lookup(at);
                }
            }
        }
    }

    /// The marker is already placed; the lookup only decides the address
    /// text, and a failed lookup still reports the coordinates.
    fn lookup(&mut self, at: LatLng) {
        self.abandon_lookup();
        let geocoder = self.geocoder.clone();
        let events = self.events.clone();
        self.lookup = Some(tokio::spawn(async move {
            let address = match geocoder.reverse(at).await {
                Ok(address) => address,
                Err(e) => {
                    warn!(lat = at.lat, lng = at.lng, error = %e, "Reverse geocode failed");
                    String::new()
                }
            };
            info!(lat = at.lat, lng = at.lng, %address, "Point selected");
            let _ = events.send(PickerEvent::PointSelected(PointSelection { lat: at.lat, lng: at.lng, address }));
        }));
    }

    /// A newer gesture replaces the pending point selection.
    fn abandon_lookup(&mut self) {
        if let Some(lookup) = self.lookup.take() {
            if !lookup.is_finished() {
                debug!("Pending reverse geocode abandoned");
                lookup.abort();
            }
        }
    }

    fn emit(&self, event: PickerEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for picker events");
        }
    }
}

/// Resolves when the armed timer fires; never resolves while disarmed.
async fn expired(timer: &mut Option<ArmedTimer>) -> TimerId {
    match timer {
        Some(armed) => {
            armed.sleep.as_mut().await;
            armed.id
        }
        None => std::future::pending().await,
    }
}
