// Wire protocol DTOs and conversions for public game server messages.
// Every frame is `{"type": <event>, "data": <payload>}` with camelCase event names.

use crate::domain::{
    Aim, BlockSnapshot, BulletSnapshot, MapSize, PlayerInput, PlayerSnapshot, WorldSnapshot,
};
use crate::use_cases::{JoinAccepted, WorldEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    // Sent once to a new connection: its id, the map and the current world.
    Init(InitDto),
    // Full record of a player that just connected (everyone but that player).
    PlayerJoined(PlayerStateDto),
    // Id of a player that disconnected.
    PlayerLeft(String),
    NameChange(NameChangeDto),
    // Full world state, every tick.
    Snapshot(WorldStateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Input(InputMessageDto),
    // Any JSON value; non-strings are stringified.
    SetName(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputMessageDto {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(default)]
    pub inputs: InputsDto,
}

/// Held keys plus the aim point in world coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputsDto {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub mouse_x: Option<f32>,
    #[serde(default)]
    pub mouse_y: Option<f32>,
    #[serde(default)]
    pub shoot: bool,
    #[serde(default)]
    pub place: bool,
    #[serde(default)]
    pub remove: bool,
}

impl From<InputsDto> for PlayerInput {
    fn from(input: InputsDto) -> Self {
        let aim = match (input.mouse_x, input.mouse_y) {
            (Some(x), Some(y)) => Aim::new(x, y),
            _ => None,
        };
        Self {
            left: input.left,
            right: input.right,
            jump: input.up,
            shoot: input.shoot,
            place: input.place,
            remove: input.remove,
            aim,
        }
    }
}

/// Text used for a `setName` payload.
pub fn name_from_value(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

// Only the tag of a client frame; the payload is not looked at.
#[derive(Deserialize)]
struct FrameKind {
    #[serde(rename = "type")]
    kind: String,
}

/// Whether a frame that failed to parse was tagged as an `input` message.
pub fn is_input_frame(text: &str) -> bool {
    serde_json::from_str::<FrameKind>(text).is_ok_and(|f| f.kind == "input")
}

pub fn wire_id(id: u64) -> String {
    id.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct InitDto {
    pub id: String,
    pub map: MapDto,
    pub state: WorldStateDto,
}

impl From<JoinAccepted> for InitDto {
    fn from(accepted: JoinAccepted) -> Self {
        Self {
            id: wire_id(accepted.player_id),
            map: accepted.map.into(),
            state: accepted.state.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapDto {
    pub w: f32,
    pub h: f32,
}

impl From<MapSize> for MapDto {
    fn from(map: MapSize) -> Self {
        Self {
            w: map.width,
            h: map.height,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NameChangeDto {
    pub id: String,
    pub name: String,
}

/// Full world state; players are keyed by id, blocks and bullets are lists.
#[derive(Debug, Clone, Serialize)]
pub struct WorldStateDto {
    pub players: BTreeMap<String, PlayerStateDto>,
    pub blocks: Vec<BlockStateDto>,
    pub bullets: Vec<BulletStateDto>,
}

impl From<WorldSnapshot> for WorldStateDto {
    fn from(state: WorldSnapshot) -> Self {
        Self {
            players: state
                .players
                .iter()
                .map(|p| (wire_id(p.id), PlayerStateDto::from(p)))
                .collect(),
            blocks: state.blocks.iter().map(BlockStateDto::from).collect(),
            bullets: state.bullets.iter().map(BulletStateDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub on_ground: bool,
    pub health: i32,
    pub name: String,
    pub inputs_seq: u64,
}

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: wire_id(p.id),
            x: p.x,
            y: p.y,
            w: p.w,
            h: p.h,
            vx: p.vx,
            vy: p.vy,
            speed: p.speed,
            on_ground: p.on_ground,
            health: p.health,
            name: p.name.clone(),
            inputs_seq: p.input_seq,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub owner: String,
}

impl From<&BlockSnapshot> for BlockStateDto {
    fn from(b: &BlockSnapshot) -> Self {
        Self {
            id: wire_id(b.id),
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            owner: wire_id(b.owner_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub owner: String,
    pub life: f32,
}

impl From<&BulletSnapshot> for BulletStateDto {
    fn from(b: &BulletSnapshot) -> Self {
        Self {
            id: wire_id(b.id),
            x: b.x,
            y: b.y,
            vx: b.vx,
            vy: b.vy,
            owner: wire_id(b.owner_id),
            life: b.life,
        }
    }
}

impl From<WorldEvent> for ServerMessage {
    fn from(event: WorldEvent) -> Self {
        match event {
            WorldEvent::Snapshot(state) => ServerMessage::Snapshot(state.into()),
            WorldEvent::PlayerJoined(player) => {
                ServerMessage::PlayerJoined(PlayerStateDto::from(&player))
            }
            WorldEvent::PlayerLeft { player_id } => ServerMessage::PlayerLeft(wire_id(player_id)),
            WorldEvent::NameChanged { player_id, name } => {
                ServerMessage::NameChange(NameChangeDto {
                    id: wire_id(player_id),
                    name,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn player(id: u64) -> PlayerSnapshot {
        PlayerSnapshot {
            id,
            x: 100.0,
            y: 100.0,
            w: 28.0,
            h: 48.0,
            vx: 0.0,
            vy: 0.0,
            speed: 220.0,
            on_ground: true,
            health: 100,
            name: "P-0007".to_string(),
            input_seq: 3,
        }
    }

    fn to_json(msg: ServerMessage) -> Value {
        serde_json::to_value(&msg).expect("server messages serialize")
    }

    #[test]
    fn when_player_leaves_then_payload_is_only_the_id() {
        let value = to_json(WorldEvent::PlayerLeft { player_id: 7 }.into());
        assert_eq!(value, json!({ "type": "playerLeft", "data": "7" }));
    }

    #[test]
    fn when_player_joins_then_full_record_uses_camel_case_fields() {
        let value = to_json(WorldEvent::PlayerJoined(player(7)).into());

        assert_eq!(value["type"], "playerJoined");
        assert_eq!(value["data"]["id"], "7");
        assert_eq!(value["data"]["onGround"], true);
        assert_eq!(value["data"]["inputsSeq"], 3);
        assert_eq!(value["data"]["health"], 100);
        assert_eq!(value["data"]["w"], 28.0);
    }

    #[test]
    fn when_init_is_built_then_it_carries_id_map_and_keyed_players() {
        let accepted = JoinAccepted {
            player_id: 7,
            map: MapSize {
                width: 1200.0,
                height: 800.0,
            },
            state: WorldSnapshot {
                players: vec![player(7)],
                blocks: vec![BlockSnapshot {
                    id: 2,
                    owner_id: 7,
                    x: 40.0,
                    y: 40.0,
                    w: 40.0,
                    h: 40.0,
                }],
                bullets: vec![],
            },
            cursor: 0,
        };

        let value = to_json(ServerMessage::Init(accepted.into()));

        assert_eq!(value["type"], "init");
        assert_eq!(value["data"]["id"], "7");
        assert_eq!(value["data"]["map"], json!({ "w": 1200.0, "h": 800.0 }));
        assert_eq!(value["data"]["state"]["players"]["7"]["name"], "P-0007");
        assert_eq!(value["data"]["state"]["blocks"][0]["owner"], "7");
        assert_eq!(value["data"]["state"]["bullets"], json!([]));
    }

    #[test]
    fn when_name_changes_then_event_is_name_change() {
        let value = to_json(
            WorldEvent::NameChanged {
                player_id: 7,
                name: "Ace".to_string(),
            }
            .into(),
        );
        assert_eq!(
            value,
            json!({ "type": "nameChange", "data": { "id": "7", "name": "Ace" } })
        );
    }

    #[test]
    fn when_input_message_is_parsed_then_missing_fields_default_to_released() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"input","data":{"seq":12,"inputs":{"right":true,"mouseX":300.5,"mouseY":124}}}"#,
        )
        .expect("input should parse");

        let ClientMessage::Input(dto) = msg else {
            panic!("expected input message");
        };
        assert_eq!(dto.seq, Some(12));
        let input = PlayerInput::from(dto.inputs);
        assert!(input.right);
        assert!(!input.left && !input.jump && !input.shoot && !input.place && !input.remove);
        assert_eq!(input.aim, Aim::new(300.5, 124.0));
    }

    #[test]
    fn when_only_one_mouse_coordinate_is_sent_then_there_is_no_aim() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"input","data":{"inputs":{"shoot":true,"mouseX":1}}}"#)
                .expect("input should parse");

        let ClientMessage::Input(dto) = msg else {
            panic!("expected input message");
        };
        assert_eq!(dto.seq, None);
        assert!(PlayerInput::from(dto.inputs).aim.is_none());
    }

    #[test]
    fn when_input_has_wrong_field_types_then_parsing_fails() {
        let parsed =
            serde_json::from_str::<ClientMessage>(r#"{"type":"input","data":{"inputs":{"left":"yes"}}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn when_input_payload_is_broken_then_frame_is_still_recognized_as_input() {
        let text = r#"{"type":"input","data":{"inputs":{"right":false,"left":1}}}"#;
        assert!(serde_json::from_str::<ClientMessage>(text).is_err());
        assert!(is_input_frame(text));
        assert!(is_input_frame(r#"{"type":"input","data":"nope"}"#));
    }

    #[test]
    fn when_frame_is_not_tagged_input_then_it_is_not_an_input_frame() {
        assert!(!is_input_frame("{not json"));
        assert!(!is_input_frame(r#"{"type":"setName"}"#));
        assert!(!is_input_frame(r#"{"type":7,"data":{}}"#));
        assert!(!is_input_frame(r#"{"kind":"input"}"#));
    }

    #[test]
    fn when_set_name_carries_a_non_string_then_it_is_stringified() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"setName","data":42}"#).expect("setName should parse");
        let ClientMessage::SetName(value) = msg else {
            panic!("expected setName message");
        };
        assert_eq!(name_from_value(value), "42");
        assert_eq!(name_from_value(json!("Ace")), "Ace");
    }
}
