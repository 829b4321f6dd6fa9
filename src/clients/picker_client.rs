use crate::map_picker::{GestureState, LatLng, PickerError, PickerRequest, PointerInput};
use tokio::sync::{mpsc, oneshot};
use tracing::{instrument, trace};

/// Client for the map picker actor.
///
/// Raw mouse and touch callbacks from the host map are forwarded as-is; the
/// actor decides what they mean.
#[derive(Clone)]
pub struct PickerClient {
    sender: mpsc::Sender<PickerRequest>,
}

impl PickerClient {
    pub fn new(sender: mpsc::Sender<PickerRequest>) -> Self {
        Self { sender }
    }

    async fn send(&self, request: PickerRequest) -> Result<(), PickerError> {
        trace!(?request, "Sending request");
        self.sender.send(request).await.map_err(|_| PickerError::ActorClosed)
    }

    async fn input(&self, input: PointerInput) -> Result<(), PickerError> {
        self.send(PickerRequest::Input(input)).await
    }

    pub async fn pointer_down(&self, at: LatLng) -> Result<(), PickerError> {
        self.input(PointerInput::Down(at)).await
    }

    pub async fn pointer_move(&self, at: LatLng) -> Result<(), PickerError> {
        self.input(PointerInput::Move(at)).await
    }

    pub async fn pointer_up(&self, at: LatLng) -> Result<(), PickerError> {
        self.input(PointerInput::Up(at)).await
    }

    /// Starts a gesture only when exactly one finger is down.
    pub async fn touch_start(&self, touches: &[LatLng]) -> Result<(), PickerError> {
        match PointerInput::touch_start(touches) {
            Some(input) => self.input(input).await,
            None => Ok(()),
        }
    }

    pub async fn touch_move(&self, touches: &[LatLng]) -> Result<(), PickerError> {
        match PointerInput::touch_move(touches) {
            Some(input) => self.input(input).await,
            None => Ok(()),
        }
    }

    /// `at` is where the lifted finger was.
    pub async fn touch_end(&self, at: LatLng) -> Result<(), PickerError> {
        self.input(PointerInput::Up(at)).await
    }

    #[instrument(skip(self))]
    pub async fn set_editing(&self, editing: bool) -> Result<(), PickerError> {
        self.send(PickerRequest::SetEditing(editing)).await
    }

    pub async fn state(&self) -> Result<GestureState, PickerError> {
        let (respond_to, response) = oneshot::channel();
        self.send(PickerRequest::State(respond_to)).await?;
        response.await.map_err(|_| PickerError::ActorClosed)
    }
}
