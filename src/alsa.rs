//! ALSA sequencer graph, parsed from `aconnect` text dumps.
//!
//! `aconnect -l` carries most of the information but does not distinguish
//! readable from writable ports, so two separately-issued directional
//! listings are consulted first to derive the direction of every
//! `client:port` key. A key present in both listings yields two independent
//! [`Port`] records sharing the local id and differing only in the
//! direction segment of the qualified id.

use std::collections::HashSet;

use crate::graph::{Device, DeviceKind, Direction, Graph, Link, Object, ObjectId, Port};

/// Line shapes in `aconnect` output, told apart purely by leading
/// whitespace. Client headers are unindented, port declarations sit at four
/// spaces, connection declarations deeper (a tab in practice).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LineClass<'a> {
    Blank,
    Client(&'a str),
    Port(&'a str),
    Connection(&'a str),
}

fn classify(line: &str) -> LineClass<'_> {
    let stripped = line.trim();
    if stripped.is_empty() {
        LineClass::Blank
    } else if line.starts_with("    ") {
        LineClass::Port(stripped)
    } else if !line.starts_with('\t') {
        LineClass::Client(stripped)
    } else {
        LineClass::Connection(stripped)
    }
}

/// `client <id>: '<name>'` with a numeric id.
fn parse_client_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("client ")?;
    let (id, rest) = rest.split_once(':')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (_, rest) = rest.split_once('\'')?;
    let (name, _) = rest.split_once('\'')?;
    Some((id.to_string(), name.to_string()))
}

/// Port names arrive single-quoted; normalize the quotes and decode as a
/// string literal, then trim.
fn decode_port_name(raw: &str) -> Option<String> {
    let normalized = raw.replace('\'', "\"");
    let decoded: String = serde_json::from_str(&normalized).ok()?;
    Some(decoded.trim().to_string())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ConnDir {
    To,
    From,
}

/// `(Connected|Connecting) (To:|From:) <peers>` where peers is a
/// comma-separated list of `client:port` descriptors, with bracketed
/// annotations stripped before splitting.
fn parse_connection(line: &str) -> Option<(ConnDir, Vec<String>)> {
    let rest = line
        .strip_prefix("Connected ")
        .or_else(|| line.strip_prefix("Connecting "))?;
    let (dir, peers) = if let Some(r) = rest.strip_prefix("To: ") {
        (ConnDir::To, r)
    } else if let Some(r) = rest.strip_prefix("From: ") {
        (ConnDir::From, r)
    } else {
        return None;
    };
    let peers = strip_annotations(peers);
    Some((
        dir,
        peers
            .split(", ")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    ))
}

fn strip_annotations(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Qualified `client:port` keys from one directional `aconnect` listing.
pub fn parse_port_dirs(raw: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current: Option<String> = None;
    for line in raw.lines() {
        match classify(line) {
            LineClass::Blank => break,
            LineClass::Client(s) => {
                if let Some((id, _)) = parse_client_header(s) {
                    current = Some(id);
                }
            }
            LineClass::Port(s) => {
                if let (Some(client), Some((key, _))) = (&current, s.split_once(' ')) {
                    keys.push(format!("{client}:{key}"));
                }
            }
            LineClass::Connection(_) => {}
        }
    }
    keys
}

/// Build the sequencer graph from the two directional listings and the full
/// listing. Malformed lines are skipped; empty dumps yield an empty graph.
pub fn parse_sequencer_graph(port_dump_in: &str, port_dump_out: &str, full_dump: &str) -> Graph {
    let in_keys: HashSet<String> = parse_port_dirs(port_dump_in).into_iter().collect();
    let out_keys: HashSet<String> = parse_port_dirs(port_dump_out).into_iter().collect();

    let mut graph = Graph::default();
    let mut device: Option<Device> = None;
    // Port records created from the most recent port line; a bidirectional
    // port contributes two, and connection lines apply to all of them.
    let mut current: Vec<ObjectId> = Vec::new();
    let mut current_local = String::new();
    let mut links: Vec<Link> = Vec::new();
    let mut next_link = 0usize;

    for line in full_dump.lines() {
        match classify(line) {
            LineClass::Blank => break,
            LineClass::Client(s) => {
                if let Some((id, name)) = parse_client_header(s) {
                    if let Some(done) = device.take() {
                        graph.insert(Object::Device(done));
                    }
                    let mut dev = Device::new(id, DeviceKind::AlsaMidi);
                    dev.name = Some(name);
                    device = Some(dev);
                    current.clear();
                }
            }
            LineClass::Port(s) => {
                let Some(dev) = device.as_mut() else { continue };
                let Some((key, rest)) = s.split_once(' ') else {
                    continue;
                };
                let Some(name) = decode_port_name(rest.trim()) else {
                    continue;
                };
                current.clear();
                current_local = key.to_string();
                for (dir, keys) in [(Direction::In, &in_keys), (Direction::Out, &out_keys)] {
                    if !keys.contains(&format!("{}:{key}", dev.id)) {
                        continue;
                    }
                    let id = format!("{}:{}:{key}", dev.id, dir.segment());
                    let mut port = Port::new(
                        id.clone(),
                        dev.id.clone(),
                        key.to_string(),
                        name.clone(),
                    );
                    port.direction = Some(dir);
                    dev.ports.push(id.clone());
                    graph.insert(Object::Port(port));
                    current.push(id);
                }
            }
            LineClass::Connection(s) => {
                let Some(dev) = device.as_mut() else { continue };
                if current.is_empty() {
                    continue;
                }
                let Some((dir, peers)) = parse_connection(s) else {
                    continue;
                };
                for peer in peers {
                    // Both direction records of a bidirectional port share
                    // the raw descriptor lists.
                    for id in &current {
                        if let Some(port) = graph.port_mut(id) {
                            match dir {
                                ConnDir::To => port.wired_to.push(peer.clone()),
                                ConnDir::From => port.wired_from.push(peer.clone()),
                            }
                        }
                    }
                    let Some((peer_client, peer_port)) = peer.split_once(':') else {
                        continue;
                    };
                    let id = format!("seq-link:{next_link}");
                    next_link += 1;
                    // A From: line names the peer as the emitting side; a
                    // To: line is the reverse.
                    let link = match dir {
                        ConnDir::From => Link {
                            id: id.clone(),
                            output_node: peer_client.to_string(),
                            output_port: format!("{peer_client}:out:{peer_port}"),
                            input_node: dev.id.clone(),
                            input_port: format!("{}:in:{current_local}", dev.id),
                        },
                        ConnDir::To => Link {
                            id: id.clone(),
                            output_node: dev.id.clone(),
                            output_port: format!("{}:out:{current_local}", dev.id),
                            input_node: peer_client.to_string(),
                            input_port: format!("{peer_client}:in:{peer_port}"),
                        },
                    };
                    dev.links.push(id);
                    graph.insert(Object::Link(link.clone()));
                    links.push(link);
                }
            }
        }
    }
    if let Some(done) = device.take() {
        graph.insert(Object::Device(done));
    }

    // Endpoints may be declared after the connection line that references
    // them, so registration runs once the whole dump is in.
    for link in &links {
        graph.register_link(link);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIR_IN: &str = "\
client 0: 'System' [type=kernel]
    0 'Timer           '
    1 'Announce        '
client 14: 'Midi Through' [type=kernel]
    0 'Midi Through Port-0'
";

    const DIR_OUT: &str = "\
client 14: 'Midi Through' [type=kernel]
    0 'Midi Through Port-0'
client 24: 'USB Keyboard' [type=kernel,card=2]
    0 'USB Keyboard MIDI 1'
";

    const FULL: &str = "\
client 0: 'System' [type=kernel]
    0 'Timer           '
    1 'Announce        '
client 14: 'Midi Through' [type=kernel]
    0 'Midi Through Port-0'
\tConnected From: 24:0
client 24: 'USB Keyboard' [type=kernel,card=2]
    0 'USB Keyboard MIDI 1'
\tConnecting To: 14:0[real:0]
";

    #[test]
    fn classify_by_leading_whitespace() {
        assert_eq!(
            classify("client 14: 'Midi Through'"),
            LineClass::Client("client 14: 'Midi Through'")
        );
        assert_eq!(
            classify("    0 'Midi Through Port-0'"),
            LineClass::Port("0 'Midi Through Port-0'")
        );
        assert_eq!(
            classify("\tConnected From: 24:0"),
            LineClass::Connection("Connected From: 24:0")
        );
        assert_eq!(classify("   "), LineClass::Blank);
    }

    #[test]
    fn client_header_requires_numeric_id() {
        assert_eq!(
            parse_client_header("client 14: 'Midi Through' [type=kernel]"),
            Some(("14".into(), "Midi Through".into()))
        );
        assert_eq!(parse_client_header("client x: 'Nope'"), None);
        assert_eq!(parse_client_header("something else"), None);
    }

    #[test]
    fn port_name_is_decoded_and_trimmed() {
        assert_eq!(
            decode_port_name("'Timer           '"),
            Some("Timer".to_string())
        );
        assert_eq!(decode_port_name("no quotes"), None);
    }

    #[test]
    fn connection_line_strips_bracketed_annotations() {
        let (dir, peers) = parse_connection("Connecting To: 14:0[real:0], 20:1").unwrap();
        assert_eq!(dir, ConnDir::To);
        assert_eq!(peers, vec!["14:0", "20:1"]);
    }

    #[test]
    fn connection_line_rejects_other_text() {
        assert_eq!(parse_connection("Capabilities: read"), None);
    }

    #[test]
    fn port_dirs_collects_qualified_keys() {
        assert_eq!(parse_port_dirs(DIR_IN), vec!["0:0", "0:1", "14:0"]);
        assert_eq!(parse_port_dirs(DIR_OUT), vec!["14:0", "24:0"]);
        assert!(parse_port_dirs("").is_empty());
    }

    #[test]
    fn bidirectional_port_yields_two_records() {
        let g = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        let through = g.device("14").unwrap();
        assert_eq!(through.ports, vec!["14:in:0", "14:out:0"]);
        let p_in = g.port("14:in:0").unwrap();
        let p_out = g.port("14:out:0").unwrap();
        assert_eq!(p_in.local_id, p_out.local_id);
        assert_eq!(p_in.direction, Some(Direction::In));
        assert_eq!(p_out.direction, Some(Direction::Out));
        assert_eq!(p_in.name, "Midi Through Port-0");
    }

    #[test]
    fn every_listed_key_appears_in_a_direction_set() {
        let g = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        for port in g.ports() {
            assert!(port.direction.is_some());
        }
        // directional but not bidirectional keys yield exactly one record
        assert!(g.port("0:in:0").is_some());
        assert!(g.port("0:out:0").is_none());
        assert!(g.port("24:out:0").is_some());
        assert!(g.port("24:in:0").is_none());
    }

    #[test]
    fn connection_lines_fill_raw_descriptors_on_both_records() {
        let g = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        assert_eq!(g.port("14:in:0").unwrap().wired_from, vec!["24:0"]);
        assert_eq!(g.port("14:out:0").unwrap().wired_from, vec!["24:0"]);
        assert_eq!(g.port("24:out:0").unwrap().wired_to, vec!["14:0"]);
    }

    #[test]
    fn links_are_synthesized_and_registered_symmetrically() {
        let g = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        // one link per connection line peer, attached to the owning client
        assert_eq!(g.device("14").unwrap().links.len(), 1);
        assert_eq!(g.device("24").unwrap().links.len(), 1);

        // the From: line under 14 and the To: line under 24 describe the
        // same wire; each synthesized link records 24 as the emitter
        for link in g.links() {
            assert_eq!(link.output_port, "24:out:0");
            assert_eq!(link.input_port, "14:in:0");
        }
        assert_eq!(g.port("24:out:0").unwrap().links_in.len(), 2);
        assert_eq!(g.port("14:in:0").unwrap().links_out.len(), 2);
        assert!(g.port("14:out:0").unwrap().links_in.is_empty());
    }

    #[test]
    fn empty_or_garbage_dumps_yield_empty_graph() {
        assert!(parse_sequencer_graph("", "", "").objects.is_empty());
        let g = parse_sequencer_graph("nonsense", "???", "not a client line\n\tgarbage");
        assert!(g.objects.is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let a = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        let b = parse_sequencer_graph(DIR_IN, DIR_OUT, FULL);
        assert_eq!(a, b);
    }

    #[test]
    fn blank_line_terminates_listing() {
        let truncated = "client 14: 'Midi Through' [type=kernel]\n    0 'Midi Through Port-0'\n\nclient 24: 'Late' [type=kernel]\n";
        let g = parse_sequencer_graph(DIR_IN, DIR_OUT, truncated);
        assert!(g.device("14").is_some());
        assert!(g.device("24").is_none());
    }
}
