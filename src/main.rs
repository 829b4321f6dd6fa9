//! # Kitchen Desk
//!
//! Headless demo of the order board.
//!
//! Mounts the board for `KITCHEN_RESTAURANT_ID` against `KITCHEN_API_URL`,
//! then reads stdin line by line. Socket.IO frames (`42["order:new",{...}]`)
//! are published to the board as push events; a few commands drive it:
//!
//! ```text
//! list [pending|preparing|ready] [query]
//! approve <order id>
//! reject <order id>
//! advance <order id>
//! status <order id> <status>
//! history [query]
//! pick <lat> <lng>
//! area <lat> <lng> <lat> <lng>
//! ```
//!
//! `pick` and `area` drive a map picker in edit mode, with the long press
//! taken from `KITCHEN_LONG_PRESS_MS`.

use kitchen_desk::api::{OrderApi, RestClient, ReverseGeocoder};
use kitchen_desk::clients::{ActorClient, OrderClient, PickerClient};
use kitchen_desk::config::Config;
use kitchen_desk::lifecycle::{setup_tracing, OrderDesk};
use kitchen_desk::map_picker::{self, LatLng, PickerEvent};
use kitchen_desk::model::{HistoryFilter, Order, OrderStatus};
use kitchen_desk::notice::{NoticeLevel, Notifier};
use kitchen_desk::push::ChannelFeed;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let config = Config::load();
    if config.restaurant_id.is_empty() {
        return Err("KITCHEN_RESTAURANT_ID must be set".to_string());
    }

    let rest = Arc::new(RestClient::from_config(&config).map_err(|e| e.to_string())?);
    let api: Arc<dyn OrderApi> = rest.clone();
    let geocoder: Arc<dyn ReverseGeocoder> = rest;
    let feed = ChannelFeed::new();
    let (notifier, mut notices) = Notifier::new();

    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            let mark = match notice.level {
                NoticeLevel::Success => "✔",
                NoticeLevel::Error => "✘",
                NoticeLevel::Info => "ℹ",
            };
            println!("{mark} {}", notice.message);
        }
    });

    let mut desk = OrderDesk::mount(
        config.restaurant_id.clone(),
        api,
        &feed,
        notifier,
        config.display_offset(),
    )
    .await;

    if let Some(Ok(orders)) = desk.initial_load().await {
        info!(count = orders.len(), "Board ready");
    }

    let (picker, picker_client, mut picker_events) = map_picker::new(true, config.long_press(), geocoder);
    let picker_task = tokio::spawn(picker.run());
    tokio::spawn(async move {
        while let Some(event) = picker_events.recv().await {
            match event {
                PickerEvent::PointSelected(point) => {
                    println!("point {:.5},{:.5} {}", point.lat, point.lng, point.address)
                }
                PickerEvent::AreaSelected(area) => {
                    let bounds = area.bounds();
                    println!(
                        "area {:.5},{:.5} to {:.5},{:.5}",
                        bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
                    )
                }
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("42") || line.starts_with('[') {
            if let Err(e) = feed.publish_frame(desk.restaurant_id(), line).await {
                warn!(error = %e, "Frame skipped");
            }
            continue;
        }
        let result = match line.split_whitespace().next() {
            Some("pick" | "area") => run_picker_command(&picker_client, &config, line).await,
            _ => run_command(desk.orders(), &config, line).await,
        };
        if let Err(e) = result {
            error!(error = %e, "Command failed");
        }
    }

    drop(picker_client);
    if let Err(e) = picker_task.await {
        warn!(error = %e, "Map picker task failed");
    }
    desk.unmount().await?;
    info!("Application completed successfully");
    Ok(())
}

async fn run_command(orders: &OrderClient, config: &Config, line: &str) -> Result<(), String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    match (command, rest.as_slice()) {
        ("list", [tab, query @ ..]) => {
            let tab = OrderStatus::board_tab(tab).ok_or_else(|| format!("No board tab named {tab}"))?;
            let found = orders.filter_by_tab(tab, &query.join(" ")).await.map_err(|e| e.to_string())?;
            print_orders(&found);
        }
        ("list", []) => {
            let all = orders.snapshot().await.map_err(|e| e.to_string())?;
            print_orders(&all);
        }
        ("approve", [id]) => {
            orders.approve(id).await.map_err(|e| e.to_string())?;
        }
        ("reject", [id]) => {
            orders.reject(id).await.map_err(|e| e.to_string())?;
        }
        ("advance", [id]) => {
            let order = current(orders, id).await?;
            let next = order.status.next().ok_or_else(|| format!("Order {id} is {}, nothing follows", order.status))?;
            orders.set_status(id, next).await.map_err(|e| e.to_string())?;
        }
        ("status", [id, status]) => {
            let status: OrderStatus = status.parse().unwrap_or_default();
            let order = current(orders, id).await?;
            if !order.status.can_advance_to(&status) {
                warn!(from = %order.status, to = %status, "Transition not offered by the board, sending anyway");
            }
            orders.set_status(id, status).await.map_err(|e| e.to_string())?;
        }
        ("history", query) => {
            let history = orders
                .load_history(&config.restaurant_id)
                .await
                .map_err(|e| e.to_string())?;
            let filter = HistoryFilter::new(config.display_offset()).with_query(query.join(" "));
            let shown: Vec<Order> = filter.apply(&history).into_iter().cloned().collect();
            print_orders(&shown);
        }
        _ => warn!(line, "Unknown command"),
    }
    Ok(())
}

async fn current(orders: &OrderClient, id: &str) -> Result<Order, String> {
    orders
        .get(id.to_string())
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Order {id} is not on the board"))
}

async fn run_picker_command(picker: &PickerClient, config: &Config, line: &str) -> Result<(), String> {
    let numbers = line
        .split_whitespace()
        .skip(1)
        .map(|word| word.parse::<f64>().map_err(|e| format!("{word}: {e}")))
        .collect::<Result<Vec<f64>, String>>()?;

    match (line.starts_with("pick"), numbers.as_slice()) {
        (true, &[lat, lng]) => {
            let at = LatLng::new(lat, lng);
            picker.pointer_down(at).await.map_err(|e| e.to_string())?;
            picker.pointer_up(at).await.map_err(|e| e.to_string())?;
        }
        (false, &[lat, lng, end_lat, end_lng]) => {
            picker.pointer_down(LatLng::new(lat, lng)).await.map_err(|e| e.to_string())?;
            tokio::time::sleep(config.long_press() + Duration::from_millis(50)).await;
            let end = LatLng::new(end_lat, end_lng);
            picker.pointer_move(end).await.map_err(|e| e.to_string())?;
            picker.pointer_up(end).await.map_err(|e| e.to_string())?;
        }
        _ => warn!(line, "Unknown command"),
    }
    Ok(())
}

fn print_orders(orders: &[Order]) {
    for order in orders {
        let card = order.card();
        println!(
            "{:<12} {:<10} {:<20} {:>9.2}  {}  {}",
            card.id, card.status, card.customer, card.total, card.timestamp, card.address
        );
    }
    println!("{} order(s)", orders.len());
}
