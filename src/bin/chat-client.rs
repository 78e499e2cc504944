//! Terminal chat client.
//!
//! Connects to a chat-relay server (`CHAT_SERVER_URL`, default
//! `ws://127.0.0.1:8000`) and relays between stdin and the socket.
//!
//! An optional first argument is a bootstrap query string, e.g.
//! `chat-client 'user=alice&to=bob&msg=hi'`, which populates the inputs
//! and connects immediately. Interactive commands:
//!
//! - `/connect <name>` — connect (or reconnect) as `<name>`
//! - `@bob hello` — private message to `bob`
//! - `hello` — broadcast
//! - `/quit` — exit

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use url::Url;

use chat_relay::client::{ChatClient, UiSurface};
use chat_relay::config::ChatConfig;
use chat_relay::error::ChatError;

/// Line-oriented implementation of the client's UI surface.
#[derive(Debug)]
struct TerminalSurface {
    username: String,
    recipient: String,
    message: String,
    connect_enabled: bool,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self {
            username: String::new(),
            recipient: String::new(),
            message: String::new(),
            connect_enabled: true,
        }
    }
}

impl UiSurface for TerminalSurface {
    fn username_input(&self) -> String {
        self.username.clone()
    }
    fn recipient_input(&self) -> String {
        self.recipient.clone()
    }
    fn message_input(&self) -> String {
        self.message.clone()
    }
    fn set_username_input(&mut self, value: &str) {
        self.username = value.to_string();
    }
    fn set_recipient_input(&mut self, value: &str) {
        self.recipient = value.to_string();
    }
    fn set_message_input(&mut self, value: &str) {
        self.message = value.to_string();
    }
    fn set_status(&mut self, text: &str) {
        println!("[status] {text}");
    }
    fn set_connect_enabled(&mut self, enabled: bool) {
        self.connect_enabled = enabled;
    }
    fn append_message(&mut self, text: &str) {
        println!("{text}");
    }
    fn alert(&mut self, text: &str) {
        eprintln!("[alert] {text}");
    }
}

/// Handles one stdin line. Returns `true` when the client should exit.
fn handle_line(client: &mut ChatClient<TerminalSurface>, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    if line == "/quit" {
        return true;
    }
    if let Some(name) = line.strip_prefix("/connect ") {
        // The connect control is disabled while a connection is open.
        if client.surface().connect_enabled {
            client.surface_mut().set_username_input(name);
            client.connect();
        } else {
            eprintln!("[alert] Already connected");
        }
        return false;
    }

    if let Some(rest) = line.strip_prefix('@') {
        let (to, body) = rest.split_once(' ').unwrap_or((rest, ""));
        client.surface_mut().set_recipient_input(to);
        client.surface_mut().set_message_input(body);
    } else {
        client.surface_mut().set_recipient_input("");
        client.surface_mut().set_message_input(line);
    }
    client.send_message();
    false
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = ChatConfig::from_env()?;
    let server_url = Url::parse(&config.server_url).map_err(ChatError::InvalidUrl)?;
    let mut client = ChatClient::new(server_url, TerminalSurface::default());

    if let Some(query) = std::env::args().nth(1) {
        client.bootstrap(&query);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if handle_line(&mut client, &line) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            alive = client.drive() => {
                if !alive {
                    break;
                }
            }
        }
    }

    Ok(())
}
