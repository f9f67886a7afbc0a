//! Login and dashboard pages. Every interpolated value goes through `html_escape`.

use crate::{
    admin::monitor::ServerSnapshot,
    auth::CredentialScheme,
    config::ServerConfig,
};
use std::time::Duration;

const WORKING_DIR_MAX: usize = 30;
const SESSION_ID_PREFIX: usize = 8;

const STYLE: &str = r"
:root { --bg: #0a0a0f; --card: #12121a; --border: #2a2a3a; --text: #e0e0e0;
        --dim: #888; --accent: #00d4ff; --success: #00ff88; --warning: #ffaa00; --danger: #ff4466; }
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: 'SF Mono', 'Fira Code', monospace; background: var(--bg); color: var(--text); padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; }
header { display: flex; justify-content: space-between; align-items: center; padding: 20px 0;
         border-bottom: 1px solid var(--border); margin-bottom: 30px; }
.logo { display: flex; gap: 12px; align-items: center; font-size: 24px; font-weight: bold; color: var(--accent); }
.logo img { height: 40px; }
.status-badge { padding: 8px 16px; border: 1px solid var(--success); border-radius: 20px; font-size: 14px; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 20px; }
.card h2 { font-size: 14px; text-transform: uppercase; color: var(--dim); margin-bottom: 15px; }
.stat { display: flex; justify-content: space-between; padding: 10px 0; border-bottom: 1px solid var(--border); }
.stat-label { color: var(--dim); }
.stat-value { color: var(--accent); font-weight: bold; }
.session-item { padding: 12px; border: 1px solid var(--border); border-radius: 8px; margin-bottom: 10px; }
.guest { color: var(--warning); }
.empty { color: var(--dim); font-style: italic; }
.token-display { background: rgba(0, 0, 0, 0.5); padding: 15px; border-radius: 8px; word-break: break-all; color: var(--warning); }
.refresh-note { text-align: center; color: var(--dim); font-size: 12px; margin-top: 30px; }
.refresh-note a { color: var(--accent); }
.login-form { max-width: 400px; margin: 100px auto; }
.login-form input { width: 100%; padding: 15px; background: var(--card); border: 1px solid var(--border);
                    border-radius: 8px; color: var(--text); font-size: 24px; margin-bottom: 15px; text-align: center; }
.login-form button { width: 100%; padding: 15px; background: var(--accent); border: none; border-radius: 8px;
                     font-weight: bold; cursor: pointer; }
.hint { text-align: center; margin-top: 20px; color: var(--dim); font-size: 12px; }
.error { border: 1px solid var(--danger); padding: 15px; border-radius: 8px; margin-bottom: 15px; color: var(--danger); }
";

/// Values shown on the dashboard.
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub config: &'a ServerConfig,
    pub snapshot: &'a ServerSnapshot,
    pub uptime: Duration,
}

/// Escapes HTML special characters.
#[must_use]
pub fn html_escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

fn layout(title: &str, content: &str, auto_refresh: bool) -> String {
    let refresh = if auto_refresh {
        "<script>setTimeout(() => location.reload(), 5000);</script>"
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="icon" type="image/png" href="/favicon.ico">
<style>{STYLE}</style>
</head>
<body>
<div class="container">
{content}
</div>
{refresh}
</body>
</html>
"#,
        title = html_escape(title),
    )
}

#[must_use]
pub fn login_page(scheme: CredentialScheme, error: Option<&str>) -> String {
    let error_html = error.map_or_else(String::new, |message| {
        format!(r#"<div class="error">{}</div>"#, html_escape(message))
    });

    let (input, hint) = match scheme {
        CredentialScheme::Pin => (
            r#"<input type="text" name="pin" placeholder="000000" maxlength="6" pattern="[0-9]{6}" inputmode="numeric" autocomplete="off" autofocus>"#,
            "Enter the 6-digit PIN shown in the terminal",
        ),
        CredentialScheme::Token => (
            r#"<input type="password" name="token" placeholder="auth token" autocomplete="off" autofocus>"#,
            "Enter the auth token from the server config",
        ),
    };

    // POST keeps the credential out of the URL and browser history.
    let content = format!(
        r#"<div class="login-form">
<div style="text-align: center; margin-bottom: 30px;">
<img src="/admin/logo" alt="DarkCode" style="height: 80px; margin-bottom: 15px;">
<h1 style="color: var(--accent);">Admin Login</h1>
</div>
{error_html}
<form method="post" action="/admin/login">
{input}
<button type="submit">Login</button>
</form>
<p class="hint">{hint}</p>
</div>"#
    );

    layout("DarkCode Server Admin", &content, false)
}

#[must_use]
pub fn dashboard_page(view: &DashboardView<'_>) -> String {
    let config = view.config;
    let snapshot = view.snapshot;
    let working_dir = config.working_dir.display().to_string();

    let content = format!(
        r#"<header>
<div class="logo"><img src="/admin/logo" alt="DarkCode"> DARKCODE <span>admin</span></div>
<div class="status-badge">Server Running</div>
</header>
<div class="grid">
<div class="card">
<h2>Server Status</h2>
{uptime}
{port}
<div class="stat"><span class="stat-label">Working Directory</span><span class="stat-value" title="{working_dir_full}">{working_dir_short}</span></div>
{state}
{device_lock}
{tls}
</div>
<div class="card">
<h2>Active Sessions ({session_count})</h2>
<div class="sessions-list">{sessions}</div>
</div>
<div class="card">
<h2>Authentication</h2>
<p class="stat-label" style="margin-bottom: 10px;">Auth Token (masked)</p>
<div class="token-display">{token_masked}</div>
</div>
<div class="card">
<h2>Connection Info</h2>
{server_name}
{ws_url}
{tailscale}
</div>
</div>
<p class="refresh-note">Auto-refreshing every 5 seconds | <a href="/admin/logout">Logout</a></p>"#,
        uptime = stat("Uptime", &format_uptime(view.uptime)),
        port = stat("Port", &config.port.to_string()),
        working_dir_full = html_escape(&working_dir),
        working_dir_short = html_escape(&shorten(&working_dir, WORKING_DIR_MAX)),
        state = stat("Server State", snapshot.state.as_str()),
        device_lock = stat(
            "Device Lock",
            if config.device_lock { "Enabled" } else { "Disabled" }
        ),
        tls = stat(
            "TLS",
            if config.tls_enabled {
                "Enabled (wss://)"
            } else {
                "Disabled (ws://)"
            }
        ),
        session_count = snapshot.sessions.len(),
        sessions = sessions_html(snapshot),
        token_masked = html_escape(&config.masked_token()),
        server_name = stat("Server Name", &config.server_name),
        ws_url = stat("WebSocket URL", &config.ws_url()),
        tailscale = ServerConfig::tailscale_host()
            .map_or_else(String::new, |ip| stat("Tailscale IP", &ip)),
    );

    layout("DarkCode Server Admin", &content, true)
}

fn stat(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><span class="stat-label">{}</span><span class="stat-value">{}</span></div>"#,
        html_escape(label),
        html_escape(value)
    )
}

fn sessions_html(snapshot: &ServerSnapshot) -> String {
    if snapshot.sessions.is_empty() {
        return r#"<p class="empty">No active sessions</p>"#.to_string();
    }

    snapshot
        .sessions
        .iter()
        .map(|session| {
            let short_id: String = session.id.chars().take(SESSION_ID_PREFIX).collect();
            let guest = if session.is_guest {
                r#" <span class="guest">[guest]</span>"#
            } else {
                ""
            };
            format!(
                r#"<div class="session-item"><div class="session-id">ID: {}...{guest}</div><div class="session-info"><span>IP: {}</span> <span>Msgs: {}</span></div></div>"#,
                html_escape(&short_id),
                html_escape(&session.client_ip),
                session.message_count
            )
        })
        .collect()
}

/// `H:MM:SS`, prefixed with the day count once past 24 hours.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    match days {
        0 => format!("{hours}:{minutes:02}:{seconds:02}"),
        1 => format!("1 day, {hours}:{minutes:02}:{seconds:02}"),
        _ => format!("{days} days, {hours}:{minutes:02}:{seconds:02}"),
    }
}

/// Keep the tail of long paths, which is the part worth reading.
fn shorten(value: &str, max: usize) -> String {
    let count = value.chars().count();
    if count <= max {
        return value.to_string();
    }
    let tail: String = value.chars().skip(count - (max - 3)).collect();
    format!("...{tail}")
}
