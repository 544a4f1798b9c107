//! External command gateway: the only component that invokes the host
//! subsystem tools.
//!
//! Every operation is synchronous and blocking, with no retries. The core
//! never distinguishes failure causes; a failed invocation surfaces as
//! empty text or a false status, with a warning on the log as the only
//! diagnostic.

use std::process::Command;

use crate::config::Commands;
use crate::graph::Direction;

pub trait Gateway {
    /// One directional sequencer port listing.
    fn list_ports(&self, direction: Direction) -> String;
    /// The full sequencer graph listing.
    fn list_sequencer_graph(&self) -> String;
    /// The multimedia object dump.
    fn list_object_graph(&self) -> String;
    /// Connect two multimedia ports by object id.
    fn connect(&self, output_id: &str, input_id: &str) -> bool;
    /// Tear down a multimedia link by object id.
    fn disconnect(&self, link_id: &str) -> bool;
    /// Connect two sequencer ports by `client:port` descriptor; the
    /// sequencer addresses connections by endpoint pair, not link id.
    fn connect_sequencer(&self, sender: &str, dest: &str) -> bool;
    fn disconnect_sequencer(&self, sender: &str, dest: &str) -> bool;
}

/// Production gateway shelling out to `aconnect`, `pw-cli` and `pw-link`.
pub struct SystemGateway {
    commands: Commands,
}

impl SystemGateway {
    pub fn new(commands: Commands) -> Self {
        SystemGateway { commands }
    }
}

/// `aconnect` names its flags from the subscriber's point of view: `-i`
/// lists readable ports (senders), `-o` writable ports (receivers).
fn direction_flag(direction: Direction) -> &'static str {
    match direction {
        Direction::Out => "-i",
        Direction::In => "-o",
    }
}

fn capture(program: &str, args: &[&str]) -> String {
    match Command::new(program).args(args).output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
        Err(err) => {
            log::warn!("{program} {}: {err}", args.join(" "));
            String::new()
        }
    }
}

fn run(program: &str, args: &[&str]) -> bool {
    match Command::new(program).args(args).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            log::warn!("{program} {}: exited with {status}", args.join(" "));
            false
        }
        Err(err) => {
            log::warn!("{program} {}: {err}", args.join(" "));
            false
        }
    }
}

impl Gateway for SystemGateway {
    fn list_ports(&self, direction: Direction) -> String {
        capture(&self.commands.aconnect, &[direction_flag(direction)])
    }

    fn list_sequencer_graph(&self) -> String {
        capture(&self.commands.aconnect, &["-l"])
    }

    fn list_object_graph(&self) -> String {
        capture(&self.commands.pw_cli, &["ls"])
    }

    fn connect(&self, output_id: &str, input_id: &str) -> bool {
        run(&self.commands.pw_link, &[output_id, input_id])
    }

    fn disconnect(&self, link_id: &str) -> bool {
        run(&self.commands.pw_link, &["-d", link_id])
    }

    fn connect_sequencer(&self, sender: &str, dest: &str) -> bool {
        run(&self.commands.aconnect, &[sender, dest])
    }

    fn disconnect_sequencer(&self, sender: &str, dest: &str) -> bool {
        run(&self.commands.aconnect, &["-d", sender, dest])
    }
}
