use kitchen_desk::api::mock::ScriptedGeocoder;
use kitchen_desk::clients::PickerClient;
use kitchen_desk::config::Config;
use kitchen_desk::map_picker::{
    self, AreaSelection, GestureState, LatLng, LatLngBounds, MapSelection, PickerEvent, PointSelection,
    LONG_PRESS,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};

const A: LatLng = LatLng::new(23.2156, 72.6369);
const B: LatLng = LatLng::new(23.2301, 72.6512);
const C: LatLng = LatLng::new(23.2010, 72.6200);

fn spawn_picker(editing: bool, geocoder: &ScriptedGeocoder) -> (PickerClient, UnboundedReceiver<PickerEvent>) {
    let (picker, client, events) = map_picker::new(editing, LONG_PRESS, Arc::new(geocoder.clone()));
    tokio::spawn(picker.run());
    (client, events)
}

async fn next(events: &mut UnboundedReceiver<PickerEvent>) -> PickerEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for picker event")
        .expect("picker event stream closed")
}

/// Let the picker drain its queue without moving the clock.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_tap_picks_point_at_down_coordinate() {
    let geocoder = ScriptedGeocoder::answering("Sector 21, Gandhinagar");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    picker.pointer_up(B).await.unwrap();

    assert_eq!(next(&mut events).await, PickerEvent::PanningChanged(false));
    assert_eq!(next(&mut events).await, PickerEvent::PanningChanged(true));
    assert_eq!(next(&mut events).await, PickerEvent::AreaCleared);
    assert_eq!(next(&mut events).await, PickerEvent::MarkerPlaced(A));
    assert_eq!(
        next(&mut events).await,
        PickerEvent::PointSelected(PointSelection {
            lat: A.lat,
            lng: A.lng,
            address: "Sector 21, Gandhinagar".to_string(),
        })
    );
    assert_eq!(geocoder.calls(), vec![A]);
    assert_eq!(picker.state().await.unwrap(), GestureState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_still_reports_point() {
    let geocoder = ScriptedGeocoder::failing();
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    picker.pointer_up(A).await.unwrap();

    let selected = loop {
        if let Some(selection) = next(&mut events).await.selection() {
            break selection;
        }
    };
    assert_eq!(
        selected,
        MapSelection::Point(PointSelection { lat: A.lat, lng: A.lng, address: String::new() })
    );
}

#[tokio::test(start_paused = true)]
async fn test_long_press_drag_selects_area() {
    let geocoder = ScriptedGeocoder::answering("unused");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    assert_eq!(next(&mut events).await, PickerEvent::PanningChanged(false));

    sleep(LONG_PRESS + Duration::from_millis(50)).await;
    assert_eq!(next(&mut events).await, PickerEvent::AreaCleared);
    assert_eq!(picker.state().await.unwrap(), GestureState::Dragging { start: A, current: A });

    picker.pointer_move(C).await.unwrap();
    assert_eq!(next(&mut events).await, PickerEvent::AreaPreview(LatLngBounds::from_corners(A, C)));

    picker.pointer_up(B).await.unwrap();
    let area = AreaSelection { start: A, end: B };
    assert_eq!(next(&mut events).await, PickerEvent::AreaSelected(area));
    assert_eq!(next(&mut events).await, PickerEvent::PanningChanged(true));
    assert_eq!(area.bounds(), LatLngBounds::from_corners(A, B));
    assert!(geocoder.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_long_press_without_moving_selects_degenerate_area() {
    let geocoder = ScriptedGeocoder::answering("unused");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    sleep(LONG_PRESS * 2).await;
    picker.pointer_up(A).await.unwrap();

    let area = loop {
        if let PickerEvent::AreaSelected(area) = next(&mut events).await {
            break area;
        }
    };
    assert!(area.bounds().is_degenerate());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_timer_does_not_fire_for_next_press() {
    let geocoder = ScriptedGeocoder::answering("Sector 21");
    let (picker, _events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    picker.pointer_up(A).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    picker.pointer_down(B).await.unwrap();

    // Past the first press's deadline, short of the second's.
    sleep(Duration::from_millis(450)).await;
    assert!(matches!(picker.state().await.unwrap(), GestureState::Armed { origin, .. } if origin == B));

    sleep(Duration::from_millis(200)).await;
    assert_eq!(picker.state().await.unwrap(), GestureState::Dragging { start: B, current: B });
}

#[tokio::test(start_paused = true)]
async fn test_read_only_ignores_input() {
    let geocoder = ScriptedGeocoder::answering("unused");
    let (picker, mut events) = spawn_picker(false, &geocoder);

    picker.pointer_down(A).await.unwrap();
    sleep(LONG_PRESS * 2).await;
    picker.pointer_move(B).await.unwrap();
    picker.pointer_up(B).await.unwrap();
    settle().await;

    assert!(events.try_recv().is_err());
    assert_eq!(picker.state().await.unwrap(), GestureState::Idle);
    assert!(geocoder.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_leaving_edit_mode_abandons_gesture() {
    let geocoder = ScriptedGeocoder::answering("unused");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    assert_eq!(next(&mut events).await, PickerEvent::PanningChanged(false));
    picker.set_editing(false).await.unwrap();

    sleep(LONG_PRESS * 2).await;
    picker.pointer_up(A).await.unwrap();
    settle().await;

    assert!(events.try_recv().is_err());
    assert_eq!(picker.state().await.unwrap(), GestureState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_multi_touch_does_not_start_gesture() {
    let geocoder = ScriptedGeocoder::answering("Sector 21");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.touch_start(&[A, B]).await.unwrap();
    settle().await;
    assert_eq!(picker.state().await.unwrap(), GestureState::Idle);
    assert!(events.try_recv().is_err());

    picker.touch_start(&[A]).await.unwrap();
    sleep(LONG_PRESS + Duration::from_millis(10)).await;
    picker.touch_move(&[C, B]).await.unwrap();
    picker.touch_end(C).await.unwrap();

    let area = loop {
        if let PickerEvent::AreaSelected(area) = next(&mut events).await {
            break area;
        }
    };
    assert_eq!(area, AreaSelection { start: A, end: C });
}

async fn lookups_started(geocoder: &ScriptedGeocoder, count: usize) {
    while geocoder.calls().len() < count {
        tokio::task::yield_now().await;
    }
}

fn drain_selections(events: &mut UnboundedReceiver<PickerEvent>) -> Vec<MapSelection> {
    std::iter::from_fn(|| events.try_recv().ok()).filter_map(|event| event.selection()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_newer_tap_replaces_slow_lookup() {
    let geocoder = ScriptedGeocoder::answering("second tap").then_after(Duration::from_secs(2), "first tap");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    picker.pointer_up(A).await.unwrap();
    lookups_started(&geocoder, 1).await;

    picker.pointer_down(B).await.unwrap();
    picker.pointer_up(B).await.unwrap();
    lookups_started(&geocoder, 2).await;

    sleep(Duration::from_secs(5)).await;
    assert_eq!(
        drain_selections(&mut events),
        vec![MapSelection::Point(PointSelection { lat: B.lat, lng: B.lng, address: "second tap".to_string() })]
    );
}

#[tokio::test(start_paused = true)]
async fn test_area_after_slow_tap_stays_selected() {
    let geocoder = ScriptedGeocoder::answering("unused").then_after(Duration::from_secs(2), "first tap");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    picker.pointer_up(A).await.unwrap();
    lookups_started(&geocoder, 1).await;

    picker.pointer_down(B).await.unwrap();
    sleep(LONG_PRESS + Duration::from_millis(50)).await;
    picker.pointer_up(C).await.unwrap();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(drain_selections(&mut events), vec![MapSelection::Area(AreaSelection { start: B, end: C })]);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_edit_mode_drops_pending_lookup() {
    let geocoder = ScriptedGeocoder::answering("unused").then_after(Duration::from_secs(2), "late");
    let (picker, mut events) = spawn_picker(true, &geocoder);

    picker.pointer_down(A).await.unwrap();
    picker.pointer_up(A).await.unwrap();
    lookups_started(&geocoder, 1).await;
    picker.set_editing(false).await.unwrap();

    sleep(Duration::from_secs(5)).await;
    assert!(drain_selections(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_configured_long_press_arms_drag() {
    let config = Config::from_lookup(|key: &str| (key == "KITCHEN_LONG_PRESS_MS").then(|| "200".to_string()));
    let geocoder = ScriptedGeocoder::answering("unused");
    let (picker, client, mut events) = map_picker::new(true, config.long_press(), Arc::new(geocoder.clone()));
    tokio::spawn(picker.run());

    client.pointer_down(A).await.unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(client.state().await.unwrap(), GestureState::Dragging { start: A, current: A });

    client.pointer_up(C).await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(drain_selections(&mut events), vec![MapSelection::Area(AreaSelection { start: A, end: C })]);
    assert!(geocoder.calls().is_empty());
}
