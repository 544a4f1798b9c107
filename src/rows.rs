//! Selection and expansion state, plus the pure projection from graph and
//! state to the ordered, navigable row list.

use std::collections::{BTreeSet, HashSet};

use crate::graph::{numeric_id, Device, Direction, Graph, MediaType, ObjectId, Port};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Section {
    Inputs,
    Outputs,
    Monitors,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Inputs => "input",
            Section::Outputs => "output",
            Section::Monitors => "monitor",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum RowKind {
    Device(ObjectId),
    Label(Section),
    Port(ObjectId),
    Link { link: ObjectId, port: ObjectId },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Row {
    pub kind: RowKind,
    pub id_col: String,
    pub label: String,
    pub marked: bool,
}

impl Row {
    /// Label rows exist for grouping only.
    pub fn selectable(&self) -> bool {
        !matches!(self.kind, RowKind::Label(_))
    }

    pub fn indent(&self) -> usize {
        match self.kind {
            RowKind::Device(_) => 0,
            RowKind::Label(_) => 2,
            RowKind::Port(_) => 4,
            RowKind::Link { .. } => 8,
        }
    }
}

/// UI state threaded through the event loop; all transitions are pure
/// state-to-state and leave the graph untouched.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ViewState {
    pub expanded_devices: BTreeSet<ObjectId>,
    pub expanded_ports: BTreeSet<ObjectId>,
    pub marked_ports: BTreeSet<ObjectId>,
    pub highlight: usize,
}

impl ViewState {
    /// Toggle the mark on the highlighted row. Returns false on non-port
    /// rows, where marking is a no-op.
    pub fn toggle_mark(&mut self, rows: &[Row]) -> bool {
        let Some(RowKind::Port(id)) = rows.get(self.highlight).map(|r| &r.kind) else {
            return false;
        };
        if !self.marked_ports.remove(id) {
            self.marked_ports.insert(id.clone());
        }
        true
    }

    pub fn expand_one(&mut self, rows: &[Row]) {
        match rows.get(self.highlight).map(|r| &r.kind) {
            Some(RowKind::Device(id)) => {
                self.expanded_devices.insert(id.clone());
            }
            Some(RowKind::Port(id)) => {
                self.expanded_ports.insert(id.clone());
            }
            _ => {}
        }
    }

    pub fn collapse_one(&mut self, rows: &[Row]) {
        match rows.get(self.highlight).map(|r| &r.kind) {
            Some(RowKind::Device(id)) => {
                self.expanded_devices.remove(id);
            }
            Some(RowKind::Port(id)) => {
                self.expanded_ports.remove(id);
            }
            _ => {}
        }
    }

    pub fn expand_all(&mut self, graph: &Graph) {
        for dev in graph.devices() {
            self.expanded_devices.insert(dev.id.clone());
        }
        for port in graph.ports() {
            self.expanded_ports.insert(port.id.clone());
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded_devices.clear();
        self.expanded_ports.clear();
        self.highlight = 0;
    }

    pub fn move_up(&mut self) {
        self.highlight = self.highlight.saturating_sub(1);
    }

    pub fn move_down(&mut self, row_count: usize) {
        if self.highlight + 1 < row_count {
            self.highlight += 1;
        }
    }
}

/// Project the graph and UI state into the displayable row list.
pub fn render_rows(graph: &Graph, state: &ViewState, media: MediaType) -> Vec<Row> {
    let mut devices: Vec<&Device> = graph
        .devices()
        .filter(|d| d.kind.media_type() == media)
        .filter(|d| !d.ports.is_empty() || !d.port_groups.is_empty())
        .collect();
    devices.sort_by(|a, b| {
        numeric_id(&a.id)
            .cmp(&numeric_id(&b.id))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut rows = Vec::new();
    for dev in devices {
        push_device(graph, state, dev, &mut rows);
    }
    rows
}

fn push_device(graph: &Graph, state: &ViewState, dev: &Device, rows: &mut Vec<Row>) {
    rows.push(Row {
        kind: RowKind::Device(dev.id.clone()),
        id_col: dev.id.clone(),
        label: dev.display_name().to_string(),
        marked: false,
    });
    if !state.expanded_devices.contains(&dev.id) {
        return;
    }

    // Ports hang off the device node itself or off one of its portgroup
    // nodes.
    let node_ids: HashSet<&str> = std::iter::once(dev.id.as_str())
        .chain(dev.port_groups.iter().map(String::as_str))
        .collect();
    let mut ports: Vec<&Port> = graph
        .ports()
        .filter(|p| node_ids.contains(p.node_id.as_str()))
        .collect();
    ports.sort_by(|a, b| a.local_id.cmp(&b.local_id));

    let sections = [
        (
            Section::Inputs,
            ports
                .iter()
                .filter(|p| p.direction == Some(Direction::In))
                .copied()
                .collect::<Vec<_>>(),
        ),
        (
            Section::Outputs,
            ports
                .iter()
                .filter(|p| p.direction == Some(Direction::Out) && !p.is_monitor())
                .copied()
                .collect(),
        ),
        (
            Section::Monitors,
            ports
                .iter()
                .filter(|p| p.direction == Some(Direction::Out) && p.is_monitor())
                .copied()
                .collect(),
        ),
    ];

    for (section, ports) in sections {
        if ports.is_empty() {
            continue;
        }
        rows.push(Row {
            kind: RowKind::Label(section),
            id_col: String::new(),
            label: section.label().to_string(),
            marked: false,
        });
        for port in ports {
            push_port(graph, state, port, rows);
        }
    }
}

fn push_port(graph: &Graph, state: &ViewState, port: &Port, rows: &mut Vec<Row>) {
    rows.push(Row {
        kind: RowKind::Port(port.id.clone()),
        id_col: port.id.clone(),
        label: format!("{}: {}", port.local_id, port.name),
        marked: state.marked_ports.contains(&port.id),
    });
    if !state.expanded_ports.contains(&port.id) {
        return;
    }

    // links_in holds links this port emits into, links_out links it
    // receives from; the opposite endpoint names the peer device
    let mut emitting = port.links_in.clone();
    emitting.sort();
    let mut receiving = port.links_out.clone();
    receiving.sort();

    for link_id in emitting {
        if let Some(link) = graph.link(&link_id) {
            let peer = graph
                .endpoint_device_name(&link.input_port)
                .unwrap_or_default()
                .to_string();
            rows.push(link_row(link_id, &port.id, format!("-> {peer}")));
        }
    }
    for link_id in receiving {
        if let Some(link) = graph.link(&link_id) {
            let peer = graph
                .endpoint_device_name(&link.output_port)
                .unwrap_or_default()
                .to_string();
            rows.push(link_row(link_id, &port.id, format!("<- {peer}")));
        }
    }
}

fn link_row(link: ObjectId, port: &str, label: String) -> Row {
    Row {
        kind: RowKind::Link {
            link,
            port: port.to_string(),
        },
        id_col: String::new(),
        label,
        marked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::pw::parse_object_dump;

    const DUMP: &str = "\
\tid 40, type PipeWire:Interface:Device/3
\t\tmedia.class = \"Audio/Device\"
\t\tdevice.nick = \"Built-in Audio\"
\tid 51, type PipeWire:Interface:Node/3
\t\tmedia.class = \"Audio/Sink\"
\t\tdevice.id = \"40\"
\t\tnode.nick = \"Built-in Sink\"
\tid 52, type PipeWire:Interface:Node/3
\t\tmedia.type = \"Audio\"
\t\tnode.name = \"firefox\"
\tid 60, type PipeWire:Interface:Port/3
\t\tport.id = \"0\"
\t\tnode.id = \"51\"
\t\tport.direction = \"in\"
\t\tport.name = \"playback_FL\"
\tid 61, type PipeWire:Interface:Port/3
\t\tport.id = \"1\"
\t\tnode.id = \"51\"
\t\tport.direction = \"out\"
\t\tport.name = \"monitor_FL\"
\t\tport.monitor = \"true\"
\tid 62, type PipeWire:Interface:Port/3
\t\tport.id = \"0\"
\t\tnode.id = \"52\"
\t\tport.direction = \"out\"
\t\tport.name = \"output_FL\"
\tid 70, type PipeWire:Interface:Link/3
\t\tlink.output.node = \"52\"
\t\tlink.output.port = \"62\"
\t\tlink.input.node = \"51\"
\t\tlink.input.port = \"60\"
";

    fn graph() -> Graph {
        annotate(&parse_object_dump(DUMP))
    }

    fn labels(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn collapsed_view_lists_devices_in_numeric_order() {
        let g = graph();
        let rows = render_rows(&g, &ViewState::default(), MediaType::Audio);
        assert_eq!(labels(&rows), vec!["Built-in Audio", "firefox"]);
        assert!(rows.iter().all(|r| matches!(r.kind, RowKind::Device(_))));
    }

    #[test]
    fn expanded_device_gets_sections_with_monitor_split_out() {
        let g = graph();
        let mut state = ViewState::default();
        state.expanded_devices.insert("40".into());
        let rows = render_rows(&g, &state, MediaType::Audio);
        assert_eq!(
            labels(&rows),
            vec![
                "Built-in Audio",
                "input",
                "0: playback_FL",
                "monitor",
                "1: monitor_FL",
                "firefox",
            ]
        );
        // label rows are not selectable
        assert!(!rows[1].selectable());
        assert!(rows[2].selectable());
    }

    #[test]
    fn expanded_port_appends_link_rows_with_peer_names() {
        let g = graph();
        let mut state = ViewState::default();
        state.expanded_devices.insert("52".into());
        state.expanded_ports.insert("62".into());
        let rows = render_rows(&g, &state, MediaType::Audio);
        // port 62 emits into the sink owned by device 40
        assert_eq!(
            labels(&rows),
            vec![
                "Built-in Audio",
                "firefox",
                "output",
                "0: output_FL",
                "-> Built-in Audio",
            ]
        );
        assert!(matches!(rows[4].kind, RowKind::Link { .. }));

        state.expanded_devices.insert("40".into());
        state.expanded_ports.insert("60".into());
        let rows = render_rows(&g, &state, MediaType::Audio);
        assert!(labels(&rows).contains(&"<- firefox"));
    }

    #[test]
    fn other_media_types_render_nothing_here() {
        let g = graph();
        assert!(render_rows(&g, &ViewState::default(), MediaType::Video).is_empty());
        assert!(render_rows(&g, &ViewState::default(), MediaType::AlsaMidi).is_empty());
    }

    #[test]
    fn toggle_mark_round_trips_on_port_rows_only() {
        let g = graph();
        let mut state = ViewState::default();
        state.expanded_devices.insert("40".into());
        let rows = render_rows(&g, &state, MediaType::Audio);

        state.highlight = 2; // "0: playback_FL"
        assert!(state.toggle_mark(&rows));
        assert!(state.marked_ports.contains("60"));
        assert!(state.toggle_mark(&rows));
        assert!(!state.marked_ports.contains("60"));

        state.highlight = 1; // "input" label
        assert!(!state.toggle_mark(&rows));
        assert!(state.marked_ports.is_empty());
    }

    #[test]
    fn marked_ports_render_marked() {
        let g = graph();
        let mut state = ViewState::default();
        state.expanded_devices.insert("40".into());
        state.marked_ports.insert("60".into());
        let rows = render_rows(&g, &state, MediaType::Audio);
        assert!(rows[2].marked);
        assert!(!rows[0].marked);
    }

    #[test]
    fn expand_and_collapse_one_are_idempotent() {
        let g = graph();
        let mut state = ViewState::default();
        let rows = render_rows(&g, &state, MediaType::Audio);
        state.expand_one(&rows);
        state.expand_one(&rows);
        assert_eq!(state.expanded_devices.len(), 1);
        state.collapse_one(&rows);
        state.collapse_one(&rows);
        assert!(state.expanded_devices.is_empty());
    }

    #[test]
    fn collapse_all_resets_everything() {
        let g = graph();
        let mut state = ViewState::default();
        state.expand_all(&g);
        state.highlight = 7;
        assert!(!state.expanded_devices.is_empty());
        assert!(!state.expanded_ports.is_empty());
        state.collapse_all();
        assert!(state.expanded_devices.is_empty());
        assert!(state.expanded_ports.is_empty());
        assert_eq!(state.highlight, 0);
    }

    #[test]
    fn highlight_moves_are_clamped() {
        let mut state = ViewState::default();
        state.move_up();
        assert_eq!(state.highlight, 0);
        state.move_down(3);
        state.move_down(3);
        state.move_down(3);
        assert_eq!(state.highlight, 2);
        state.move_down(0);
        assert_eq!(state.highlight, 2);
    }
}
