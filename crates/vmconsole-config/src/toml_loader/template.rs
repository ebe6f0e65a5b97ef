//! Commented default config file content.

pub(crate) fn default_config_toml() -> String {
    r##"# vmconsole configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[proxy]
# ws_url = "ws://127.0.0.1:5000"      # console proxy (ws:// or wss://)
# api_url = "http://127.0.0.1:5000"   # management API (http:// or https://)
# token = ""                          # JWT or API key, sent as ?token= and Bearer
# operator = "root"                   # identity this console runs as
# privileged_user = "root"            # only this identity may open the host shell

[display]
# credential = ""                     # VNC password, empty for none

[timing]
# error_close_delay_ms = 2000         # 100-60000
# control_grace_delay_ms = 2000       # 100-60000
# connect_timeout_secs = 15           # 1-300

[logging]
# level = "info"                      # error, warn, info, debug, trace
"##
    .to_string()
}
