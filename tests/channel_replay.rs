//! Decoding a recorded capture dump through the public channel API.

mod common;

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use common::{field_varint, oneway_frame, paired_frame, response_frame};
use tilepilot::{ChannelClient, Direction, ReplaySource};

fn record(request: &[u8], response: Option<&[u8]>, timestamp: f64) -> String {
    let response = match response {
        None => "null".to_string(),
        Some(bytes) => format!("\"{}\"", BASE64.encode(bytes)),
    };
    format!(
        "{{\"request_direction\":\"outbound\",\"request\":\"{}\",\"response\":{},\"timestamp\":{}}}",
        BASE64.encode(request),
        response,
        timestamp,
    )
}

#[tokio::test]
async fn dump_replays_as_typed_messages() -> anyhow::Result<()> {
    let dump = [
        record(&oneway_frame(".lq.Lobby.heatbeat", &field_varint(1, 9)), None, 1_700_000_000.25),
        record(
            &paired_frame(3, ".lq.Lobby.oauth2Login", &[]),
            Some(&response_frame(&field_varint(2, 880_001))),
            1_700_000_001.0,
        ),
    ]
    .join("\n");

    let mut channel = ChannelClient::new(ReplaySource::from_lines(&dump)?);

    let heatbeat = channel.dequeue(Duration::from_secs(1)).await?.unwrap();
    assert_eq!(heatbeat.direction, Direction::Outbound);
    assert_eq!(heatbeat.name, ".lq.Lobby.heatbeat");
    assert_eq!(heatbeat.request["no_operation_counter"], 9);
    assert!(heatbeat.response.is_none());
    assert_eq!(heatbeat.timestamp.timestamp_millis(), 1_700_000_000_250);

    let login = channel.dequeue(Duration::from_secs(1)).await?.unwrap();
    assert_eq!(login.name, ".lq.Lobby.oauth2Login");
    assert_eq!(login.response.as_ref().unwrap()["account_id"], 880_001);
    assert_eq!(channel.account_id(), Some(880_001));

    // Dump exhausted: the channel reports an empty window.
    assert!(channel.dequeue(Duration::from_secs(1)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn put_back_survives_across_replay_exhaustion() {
    let dump = record(&oneway_frame(".lq.Lobby.heatbeat", &[]), None, 1.0);
    let mut channel = ChannelClient::new(ReplaySource::from_lines(&dump).unwrap());

    let message = channel.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    channel.put_back(message.clone());

    assert_eq!(channel.dequeue(Duration::from_secs(1)).await.unwrap().unwrap(), message);
    assert!(channel.dequeue(Duration::from_secs(1)).await.unwrap().is_none());
}
