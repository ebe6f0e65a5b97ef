use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vmconsole_common::ControlVerb;

/// vmconsole: remote consoles for VMs, containers and the host.
#[derive(Parser, Debug)]
#[command(name = "vmconsole", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Proxy/API token, overriding `proxy.token` from the config.
    #[arg(long, env = "VMCONSOLE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Shell inside a container.
    Shell { name: String },
    /// Shell on the host (privileged operator only).
    Host,
    /// VNC display of a VM; reports frame statistics.
    Display {
        name: String,
        /// Display port reported by the hypervisor.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a management action (start, stop, force-stop, delete).
    Action {
        name: String,
        #[arg(value_parser = parse_verb)]
        verb: ControlVerb,
    },
}

fn parse_verb(s: &str) -> Result<ControlVerb, String> {
    s.parse()
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_with_port() {
        let args = Args::try_parse_from(["vmconsole", "display", "vm1", "--port", "5901"]).unwrap();
        match args.command {
            Command::Display { name, port } => {
                assert_eq!(name, "vm1");
                assert_eq!(port, Some(5901));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_action_verb() {
        let args = Args::try_parse_from(["vmconsole", "--log-level", "debug", "action", "vm1", "destroy"])
            .unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            args.command,
            Command::Action { verb: ControlVerb::ForceStop, .. }
        ));
    }

    #[test]
    fn rejects_unknown_verb() {
        assert!(Args::try_parse_from(["vmconsole", "action", "vm1", "reboot"]).is_err());
    }
}
