//! Classification of flat PipeWire records into the typed graph.
//!
//! Two phases so that reference resolution order never matters: every
//! record is first classified purely from its own attributes, then
//! back-references are materialized with a guard on every lookup. A failed
//! lookup skips that one registration; the record keeps its classification.

use crate::graph::{Device, DeviceKind, Direction, Graph, Link, Object, Port, PortGroup};
use crate::pw::{RawMap, RawObject};

const GROUP_CLASSES: [&str; 4] = ["Audio/Source", "Audio/Sink", "Video/Source", "Video/Sink"];

/// First matching rule wins; records matching none play no role downstream
/// and are dropped from the typed graph.
fn classify(obj: &RawObject) -> Option<Object> {
    let media_type = obj.str_attr("media.type");
    let media_class = obj.str_attr("media.class");

    if media_type == Some("Audio") || media_class == Some("Audio/Device") {
        Some(Object::Device(device_from(obj, DeviceKind::Audio)))
    } else if media_class.is_some_and(|c| c.starts_with("Midi")) {
        Some(Object::Device(device_from(obj, DeviceKind::PipewireMidi)))
    } else if media_class == Some("Video/Device") {
        let mut dev = device_from(obj, DeviceKind::Video);
        // video devices rarely carry a nick; promote the description
        dev.nick = obj.str_attr("device.description").map(str::to_string);
        Some(Object::Device(dev))
    } else if obj.attrs.contains_key("port.id") {
        Some(Object::Port(port_from(obj)))
    } else if media_class.is_some_and(|c| GROUP_CLASSES.contains(&c)) {
        Some(Object::PortGroup(group_from(obj)))
    } else if obj.attrs.contains_key("link.output.port") {
        Some(Object::Link(link_from(obj)))
    } else {
        None
    }
}

fn device_from(obj: &RawObject, kind: DeviceKind) -> Device {
    let mut dev = Device::new(obj.id.clone(), kind);
    dev.device_id = obj.id_attr("device.id");
    dev.nick = obj.str_attr("device.nick").map(str::to_string);
    dev.name = obj.str_attr("device.name").map(str::to_string);
    dev.node_name = obj.str_attr("node.name").map(str::to_string);
    dev
}

fn port_from(obj: &RawObject) -> Port {
    let mut port = Port::new(
        obj.id.clone(),
        obj.id_attr("node.id").unwrap_or_default(),
        obj.id_attr("port.id").unwrap_or_default(),
        obj.str_attr("port.name").unwrap_or_default().to_string(),
    );
    port.direction = obj.str_attr("port.direction").and_then(|d| {
        if d.contains("in") {
            Some(Direction::In)
        } else if d.contains("out") {
            Some(Direction::Out)
        } else {
            None
        }
    });
    port.alias = obj.str_attr("port.alias").map(str::to_string);
    port.monitor = obj.attrs.get("port.monitor").cloned();
    port
}

fn group_from(obj: &RawObject) -> PortGroup {
    PortGroup {
        id: obj.id.clone(),
        device_id: obj.id_attr("device.id"),
        media_class: obj.str_attr("media.class").unwrap_or_default().to_string(),
        nick: obj.str_attr("node.nick").map(str::to_string),
        name: obj.str_attr("node.description").map(str::to_string),
        node_name: obj.str_attr("node.name").map(str::to_string),
        ports: Vec::new(),
    }
}

fn link_from(obj: &RawObject) -> Link {
    Link {
        id: obj.id.clone(),
        output_node: obj.id_attr("link.output.node").unwrap_or_default(),
        output_port: obj.id_attr("link.output.port").unwrap_or_default(),
        input_node: obj.id_attr("link.input.node").unwrap_or_default(),
        input_port: obj.id_attr("link.input.port").unwrap_or_default(),
    }
}

/// Build the typed, cross-referenced graph from a flat record map.
pub fn annotate(raw: &RawMap) -> Graph {
    let mut graph = Graph::default();
    for obj in raw.values() {
        if let Some(object) = classify(obj) {
            graph.insert(object);
        }
    }

    let ids: Vec<String> = graph.objects.keys().cloned().collect();
    for id in &ids {
        match graph.objects.get(id).cloned() {
            Some(Object::Port(port)) => register_port(&mut graph, &port.id, &port.node_id),
            Some(Object::PortGroup(group)) => {
                if let Some(device_id) = &group.device_id {
                    register_group(&mut graph, &group.id, device_id);
                }
            }
            Some(Object::Link(link)) => graph.register_link(&link),
            _ => {}
        }
    }
    graph
}

/// The owning node of a port may be a device or a portgroup node; a missing
/// owner leaves the port unregistered but in the graph.
fn register_port(graph: &mut Graph, port_id: &str, node_id: &str) {
    match graph.objects.get_mut(node_id) {
        Some(Object::Device(dev)) => dev.ports.push(port_id.to_string()),
        Some(Object::PortGroup(group)) => group.ports.push(port_id.to_string()),
        _ => {}
    }
}

fn register_group(graph: &mut Graph, group_id: &str, device_id: &str) {
    if let Some(Object::Device(dev)) = graph.objects.get_mut(device_id) {
        dev.port_groups.push(group_id.to_string());
    }
}
