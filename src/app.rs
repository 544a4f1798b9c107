//! Application state and the actions shared by the TUI and the one-shot
//! CLI. All state lives here and is mutated from the single event-loop
//! flow; every graph refresh is a full from-scratch rebuild.

use crate::graph::{Direction, Graph, MediaType};
use crate::rows::{render_rows, Row, RowKind, ViewState};
use crate::{alsa, annotate, gateway::Gateway, pairing, pw};

pub struct App {
    gateway: Box<dyn Gateway>,
    pub alsa_graph: Graph,
    pub pw_graph: Graph,
    pub media_type: MediaType,
    pub view: ViewState,
    pub rows: Vec<Row>,
}

impl App {
    pub fn new(gateway: Box<dyn Gateway>) -> Self {
        let mut app = App {
            gateway,
            alsa_graph: Graph::default(),
            pw_graph: Graph::default(),
            media_type: MediaType::Audio,
            view: ViewState::default(),
            rows: Vec::new(),
        };
        app.refresh();
        app
    }

    /// Graph backing the active media type.
    pub fn graph(&self) -> &Graph {
        match self.media_type {
            MediaType::AlsaMidi => &self.alsa_graph,
            _ => &self.pw_graph,
        }
    }

    /// Rebuild both graphs from fresh dumps. Old ids are never interpreted
    /// against the new graphs; expansion and mark sets may go stale but
    /// stale ids simply stop matching.
    pub fn refresh(&mut self) {
        let port_dump_in = self.gateway.list_ports(Direction::In);
        let port_dump_out = self.gateway.list_ports(Direction::Out);
        let full_dump = self.gateway.list_sequencer_graph();
        self.alsa_graph = alsa::parse_sequencer_graph(&port_dump_in, &port_dump_out, &full_dump);
        self.pw_graph = annotate::annotate(&pw::parse_object_dump(&self.gateway.list_object_graph()));
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        self.rows = render_rows(self.graph(), &self.view, self.media_type);
        if self.view.highlight >= self.rows.len() {
            self.view.highlight = self.rows.len().saturating_sub(1);
        }
    }

    pub fn set_media_type(&mut self, media: MediaType) {
        self.media_type = media;
        self.view.highlight = 0;
        self.rebuild_rows();
    }

    pub fn move_up(&mut self) {
        self.view.move_up();
    }

    pub fn move_down(&mut self) {
        self.view.move_down(self.rows.len());
    }

    pub fn toggle_mark(&mut self) {
        if self.view.toggle_mark(&self.rows) {
            self.rebuild_rows();
        }
    }

    pub fn expand_one(&mut self) {
        self.view.expand_one(&self.rows);
        self.rebuild_rows();
    }

    pub fn collapse_one(&mut self) {
        self.view.collapse_one(&self.rows);
        self.rebuild_rows();
    }

    pub fn expand_all(&mut self) {
        match self.media_type {
            MediaType::AlsaMidi => self.view.expand_all(&self.alsa_graph),
            _ => self.view.expand_all(&self.pw_graph),
        }
        self.rebuild_rows();
    }

    pub fn collapse_all(&mut self) {
        self.view.collapse_all();
        self.rebuild_rows();
    }

    /// Bulk-connect the marked ports: partition by direction, sort both
    /// sides by display key, pair by index and issue one connect per pair.
    /// Afterwards the mark set is cleared and both graphs rebuilt,
    /// regardless of individual call outcomes.
    pub fn connect_marked(&mut self) {
        // (sort key, argument passed to the gateway)
        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut inputs: Vec<(String, String)> = Vec::new();
        let sequencer = self.media_type == MediaType::AlsaMidi;
        for id in &self.view.marked_ports {
            let Some(port) = self.graph().port(id) else {
                continue;
            };
            let arg = if sequencer {
                format!("{}:{}", port.node_id, port.local_id)
            } else {
                port.id.clone()
            };
            let entry = (port.display_key().to_string(), arg);
            match port.direction {
                Some(Direction::Out) => outputs.push(entry),
                Some(Direction::In) => inputs.push(entry),
                None => {}
            }
        }
        outputs.sort();
        inputs.sort();

        for (o, i) in pairing::pair(outputs.len(), inputs.len()) {
            if sequencer {
                self.gateway.connect_sequencer(&outputs[o].1, &inputs[i].1);
            } else {
                self.gateway.connect(&outputs[o].1, &inputs[i].1);
            }
        }
        self.view.marked_ports.clear();
        self.refresh();
    }

    /// Tear down the link under the highlight; a no-op on any other row.
    pub fn disconnect_highlighted(&mut self) {
        let Some(Row {
            kind: RowKind::Link { link, .. },
            ..
        }) = self.rows.get(self.view.highlight)
        else {
            return;
        };
        let Some(link) = self.graph().link(link) else {
            return;
        };
        if self.media_type == MediaType::AlsaMidi {
            let sender = format!("{}:{}", link.output_node, local_segment(&link.output_port));
            let dest = format!("{}:{}", link.input_node, local_segment(&link.input_port));
            self.gateway.disconnect_sequencer(&sender, &dest);
        } else {
            let id = link.id.clone();
            self.gateway.disconnect(&id);
        }
        self.refresh();
    }
}

/// Local port id from a qualified `client:dir:local` id.
fn local_segment(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}
