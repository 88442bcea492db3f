//! Command interpreter
//!
//! Runs when a chat message starts with `/`. Every reply is unicast to the
//! issuing connection as a server-styled message; nothing here broadcasts
//! to the room.

use super::{reply, server_message, reply_server_text, HandlerResult};
use crate::connection::{Connection, Outbound};
use crate::protocol::ServerFrame;
use crate::server::GatewayState;
use relay_core::{server_styled, MessageStyle, Segment};
use std::sync::Arc;
use std::time::Duration;

/// Handle a `/command args...` message
pub async fn handle(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
    input: &str,
) -> HandlerResult<()> {
    let mut parts = input.split(' ');
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "help" => help(state, connection, room),
        "online" => online(state, connection, room).await,
        "msg" => msg(state, connection, room, &args).await,
        other => {
            if let Some(effect) = FunEffect::from_command(other) {
                if state.config().fun.enabled {
                    fun(state, connection, room, effect, &args).await;
                    return Ok(());
                }
            }
            reply_server_text(
                state,
                connection,
                room,
                "Unknown command. Type /help for a list of available commands.",
            );
        }
    }
    Ok(())
}

/// Fixed help menu; command tokens are underlined
fn help(state: &GatewayState, connection: &Arc<Connection>, room: &str) {
    let menu = [
        "List of available commands:\n\n",
        "/help",
        " - Shows a list of available commands\n",
        "/online",
        " - Displays a list of online users\n",
        "/msg",
        " <user> <message> - Privately messages a single user in the current room",
    ];
    let segments = menu
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i % 2 == 1 {
                MessageStyle::UNDERLINE
            } else {
                MessageStyle::empty()
            };
            Segment::styled(style, *item)
        })
        .collect();

    reply(
        state,
        connection,
        &ServerFrame::Message {
            room: room.to_string(),
            segments: server_styled(segments),
        },
    );
}

/// List everyone in the current room, with room and global counts
async fn online(state: &GatewayState, connection: &Arc<Connection>, room: &str) {
    let mut names = Vec::new();
    for member in state.registry().members(room) {
        if let Some(name) = member.display_name().await {
            names.push(name);
        }
    }

    let segments = vec![
        Segment::plain("Users in the current room:\n"),
        Segment::styled(MessageStyle::BOLD, names.join("\n")),
        Segment::plain(format!(
            "\n\nNumber of users in this room: {}\nNumber of users globally: {}",
            names.len(),
            state.registry().connection_count()
        )),
    ];

    reply(
        state,
        connection,
        &ServerFrame::Message {
            room: room.to_string(),
            segments: server_styled(segments),
        },
    );
}

/// Private message to one user in the current room
async fn msg(state: &GatewayState, connection: &Arc<Connection>, room: &str, args: &[&str]) {
    if args.is_empty() {
        reply_server_text(state, connection, room, "No target specified!");
        return;
    }
    let target_name = args[0];

    let Some(caller) = connection.display_name().await else {
        return;
    };
    if target_name == caller {
        reply_server_text(state, connection, room, "You can't message yourself, silly!");
        return;
    }

    let Some(target) = state.registry().find_by_name(target_name, room) else {
        reply_server_text(state, connection, room, &format!("User {target_name} not found!"));
        return;
    };

    let content = args[1..].join(" ").trim().to_string();
    if content.is_empty() {
        reply_server_text(state, connection, room, "Message content empty!");
        return;
    }

    reply(
        state,
        connection,
        &ServerFrame::Message {
            room: room.to_string(),
            segments: server_styled(vec![
                Segment::styled(MessageStyle::UNDERLINE, "You to "),
                Segment::styled(MessageStyle::UNDERLINE | MessageStyle::BOLD, target_name),
                Segment::plain(": "),
                Segment::NewBlock,
                Segment::plain(content.clone()),
            ]),
        },
    );

    state.registry().deliver(
        &target,
        Outbound::Frame(
            ServerFrame::Message {
                room: room.to_string(),
                segments: server_styled(vec![
                    Segment::styled(MessageStyle::UNDERLINE | MessageStyle::BOLD, target_name),
                    Segment::styled(MessageStyle::UNDERLINE, " to you"),
                    Segment::plain(": "),
                    Segment::NewBlock,
                    Segment::plain(content),
                ]),
            }
            .encode(),
        ),
    );
}

/// Novelty visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunEffect {
    BarrelRoll,
    SpinOut,
    Small,
    FlyOut,
}

impl FunEffect {
    /// Map a command word to its effect
    #[must_use]
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "barrelroll" => Some(Self::BarrelRoll),
            "spinout" => Some(Self::SpinOut),
            "small" => Some(Self::Small),
            "flyout" => Some(Self::FlyOut),
            _ => None,
        }
    }

    /// Effect byte carried by the Fun frame
    #[must_use]
    pub const fn effect_byte(self) -> u8 {
        match self {
            Self::BarrelRoll => 0,
            Self::SpinOut => 1,
            Self::Small => 2,
            Self::FlyOut => 3,
        }
    }

    /// Past-tense label used in notices
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BarrelRoll => "Barrel roll'ed",
            Self::SpinOut => "Spin-out'd",
            Self::Small => "Small DVD'd",
            Self::FlyOut => "Fly-out'd",
        }
    }

    /// How long the effect plays on the target's screen
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::BarrelRoll => Duration::from_millis(2500),
            Self::SpinOut => Duration::from_millis(6500),
            Self::Small => Duration::from_millis(9000),
            Self::FlyOut => Duration::from_millis(6500),
        }
    }
}

/// Play a fun effect on the caller or a named target in the room
async fn fun(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
    effect: FunEffect,
    args: &[&str],
) {
    let target = if args.is_empty() {
        connection.clone()
    } else {
        match state.registry().find_by_name(args[0], room) {
            Some(target) => target,
            None => {
                reply_server_text(state, connection, room, &format!("User {} not found!", args[0]));
                return;
            }
        }
    };

    let Some(target_name) = target.display_name().await else {
        return;
    };
    let Some(caller_name) = connection.display_name().await else {
        return;
    };

    reply_server_text(
        state,
        connection,
        room,
        &format!("{} {}", effect.label(), target_name),
    );
    state.registry().deliver(
        &target,
        Outbound::Frame(
            ServerFrame::Fun {
                effect: effect.effect_byte(),
            }
            .encode(),
        ),
    );

    // tell the target once the effect has finished playing
    if target.id() != connection.id() {
        let registry = state.registry().clone();
        let room = room.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(effect.duration()).await;
            let notice = format!(
                "You've been {} by {caller_name}",
                lowercase_first(effect.label())
            );
            registry.deliver(
                &target,
                Outbound::Frame(server_message(&room, &notice).encode()),
            );
        });
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
