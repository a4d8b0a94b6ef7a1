use serde_json::{json, Value};

/// Address of the web interface on this machine.
pub fn web_chat_url(http_port: u16) -> String {
    format!("http://localhost:{http_port}")
}

/// Clickable `Web chat: http://localhost:<port>` line shown in-game on join.
pub fn join_notice(http_port: u16) -> Value {
    let url = web_chat_url(http_port);
    json!({
        "text": "Web chat: ",
        "extra": [{
            "text": url,
            "color": "blue",
            "underlined": true,
            "clickEvent": {"action": "open_url", "value": url}
        }]
    })
}
