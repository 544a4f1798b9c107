//! Typed graph model shared by both subsystems.
//!
//! Each parse builds a fresh [`Graph`] from scratch; object ids are unique
//! within one graph only and must never be interpreted against a newer one.

use std::collections::BTreeMap;

use serde_json::Value;

pub type ObjectId = String;

/// Media-type categories the UI can filter on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MediaType {
    Audio,
    AlsaMidi,
    PipewireMidi,
    Video,
}

impl MediaType {
    pub fn label(self) -> &'static str {
        match self {
            MediaType::Audio => "Audio",
            MediaType::AlsaMidi => "ALSA MIDI",
            MediaType::PipewireMidi => "PipeWire MIDI",
            MediaType::Video => "Video",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Segment used in qualified sequencer port ids (`<client>:<dir>:<local>`).
    pub fn segment(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceKind {
    Audio,
    AlsaMidi,
    PipewireMidi,
    Video,
}

impl DeviceKind {
    pub fn media_type(self) -> MediaType {
        match self {
            DeviceKind::Audio => MediaType::Audio,
            DeviceKind::AlsaMidi => MediaType::AlsaMidi,
            DeviceKind::PipewireMidi => MediaType::PipewireMidi,
            DeviceKind::Video => MediaType::Video,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Device {
    pub id: ObjectId,
    pub kind: DeviceKind,
    /// Parent device id, when this node is itself owned by a device.
    pub device_id: Option<ObjectId>,
    pub nick: Option<String>,
    pub name: Option<String>,
    pub node_name: Option<String>,
    pub ports: Vec<ObjectId>,
    pub port_groups: Vec<ObjectId>,
    /// Link ids synthesized under this client (sequencer graphs only).
    pub links: Vec<ObjectId>,
}

impl Device {
    pub fn new(id: ObjectId, kind: DeviceKind) -> Self {
        Device {
            id,
            kind,
            device_id: None,
            nick: None,
            name: None,
            node_name: None,
            ports: Vec::new(),
            port_groups: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Display name precedence: nick, name, node name.
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.name.as_deref())
            .or(self.node_name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Port {
    pub id: ObjectId,
    /// Owning node; may resolve to a device or a portgroup node, or dangle.
    pub node_id: ObjectId,
    pub local_id: String,
    pub direction: Option<Direction>,
    pub name: String,
    pub alias: Option<String>,
    /// Raw decoded `port.monitor` literal. See [`Port::is_monitor`].
    pub monitor: Option<Value>,
    /// Links for which this port is the emitting endpoint.
    pub links_in: Vec<ObjectId>,
    /// Links for which this port is the receiving endpoint.
    pub links_out: Vec<ObjectId>,
    /// Raw peer descriptors from the sequencer listing (`client:port`).
    pub wired_to: Vec<String>,
    pub wired_from: Vec<String>,
}

impl Port {
    pub fn new(id: ObjectId, node_id: ObjectId, local_id: String, name: String) -> Self {
        Port {
            id,
            node_id,
            local_id,
            direction: None,
            name,
            alias: None,
            monitor: None,
            links_in: Vec::new(),
            links_out: Vec::new(),
            wired_to: Vec::new(),
            wired_from: Vec::new(),
        }
    }

    /// A port counts as a monitor only when the decoded flag is the string
    /// `"true"`; a bare boolean literal does not match.
    pub fn is_monitor(&self) -> bool {
        matches!(&self.monitor, Some(Value::String(s)) if s == "true")
    }

    /// Key used when ordering ports for bulk connects.
    pub fn display_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct PortGroup {
    pub id: ObjectId,
    pub device_id: Option<ObjectId>,
    pub media_class: String,
    pub nick: Option<String>,
    pub name: Option<String>,
    pub node_name: Option<String>,
    pub ports: Vec<ObjectId>,
}

impl PortGroup {
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.name.as_deref())
            .or(self.node_name.as_deref())
            .unwrap_or("")
    }
}

/// A realized connection. Both endpoints are always recorded as
/// (node, port) pairs, emitting side first, regardless of which side the
/// source text reported the connection from.
#[derive(Clone, PartialEq, Debug)]
pub struct Link {
    pub id: ObjectId,
    pub output_node: ObjectId,
    pub output_port: ObjectId,
    pub input_node: ObjectId,
    pub input_port: ObjectId,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Object {
    Device(Device),
    Port(Port),
    PortGroup(PortGroup),
    Link(Link),
}

impl Object {
    pub fn id(&self) -> &str {
        match self {
            Object::Device(d) => &d.id,
            Object::Port(p) => &p.id,
            Object::PortGroup(g) => &g.id,
            Object::Link(l) => &l.id,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Graph {
    pub objects: BTreeMap<ObjectId, Object>,
}

impl Graph {
    pub fn insert(&mut self, object: Object) {
        self.objects.insert(object.id().to_string(), object);
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        match self.objects.get(id) {
            Some(Object::Device(d)) => Some(d),
            _ => None,
        }
    }

    pub fn port(&self, id: &str) -> Option<&Port> {
        match self.objects.get(id) {
            Some(Object::Port(p)) => Some(p),
            _ => None,
        }
    }

    pub fn port_mut(&mut self, id: &str) -> Option<&mut Port> {
        match self.objects.get_mut(id) {
            Some(Object::Port(p)) => Some(p),
            _ => None,
        }
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        match self.objects.get(id) {
            Some(Object::Link(l)) => Some(l),
            _ => None,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.objects.values().filter_map(|o| match o {
            Object::Device(d) => Some(d),
            _ => None,
        })
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.objects.values().filter_map(|o| match o {
            Object::Port(p) => Some(p),
            _ => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.objects.values().filter_map(|o| match o {
            Object::Link(l) => Some(l),
            _ => None,
        })
    }

    /// Register a link on both endpoint ports, or on neither.
    ///
    /// The list names are crossed on purpose: `links_in` lives on the
    /// emitting port and `links_out` on the receiving port. Row rendering
    /// relies on this orientation to pick the arrow and the opposite
    /// endpoint.
    pub fn register_link(&mut self, link: &Link) {
        if self.port(&link.output_port).is_none() || self.port(&link.input_port).is_none() {
            return;
        }
        if let Some(out) = self.port_mut(&link.output_port) {
            out.links_in.push(link.id.clone());
        }
        if let Some(inp) = self.port_mut(&link.input_port) {
            inp.links_out.push(link.id.clone());
        }
    }

    /// Display name for the device a port belongs to: the port's node, or
    /// that node's parent device when it has one.
    pub fn endpoint_device_name(&self, port_id: &str) -> Option<&str> {
        let port = self.port(port_id)?;
        let node = self.objects.get(&port.node_id)?;
        let parent_id = match node {
            Object::Device(d) => d.device_id.as_deref(),
            Object::PortGroup(g) => g.device_id.as_deref(),
            _ => None,
        };
        let owner = parent_id
            .and_then(|id| self.objects.get(id))
            .filter(|o| matches!(o, Object::Device(_)))
            .unwrap_or(node);
        match owner {
            Object::Device(d) => Some(d.display_name()),
            Object::PortGroup(g) => Some(g.display_name()),
            _ => None,
        }
    }
}

/// Numeric value of an object id for display ordering. Non-numeric ids sort
/// last.
pub fn numeric_id(id: &str) -> i64 {
    id.parse().unwrap_or(i64::MAX)
}
