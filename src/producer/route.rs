use crate::netex::objects::Line;
use crate::objects::Route;
use crate::route_type::classify_netex;
use crate::serde_helpers::parse_color;
use log::warn;
use rgb::RGB8;

fn color(line: &Line, value: &Option<String>) -> Option<RGB8> {
    let value = value.as_ref()?;
    match parse_color(value) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("line {}: {}, color ignored", line.id, e);
            None
        }
    }
}

pub fn produce_route(line: &Line, agency_id: &str) -> Route {
    Route {
        id: line.id.clone(),
        agency_id: agency_id.to_owned(),
        short_name: line.public_code.clone(),
        long_name: Some(line.name.clone()).filter(|n| !n.is_empty()),
        desc: line.description.clone(),
        route_type: classify_netex(
            line.transport_mode.as_deref(),
            line.transport_submode.as_deref(),
        ),
        route_color: color(line, &line.colour),
        route_text_color: color(line, &line.text_colour),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::RouteType;

    #[test]
    fn route_from_line() {
        let line = Line {
            id: "RUT:Line:31".to_owned(),
            name: "Tonsenhagen - Snarøya".to_owned(),
            public_code: Some("31".to_owned()),
            transport_mode: Some("bus".to_owned()),
            transport_submode: Some("localBus".to_owned()),
            colour: Some("E60000".to_owned()),
            text_colour: Some("not a color".to_owned()),
            ..Default::default()
        };
        let route = produce_route(&line, "RUT:Authority:RUT");
        assert_eq!("RUT:Line:31", route.id);
        assert_eq!("RUT:Authority:RUT", route.agency_id);
        assert_eq!(Some("31".to_owned()), route.short_name);
        assert_eq!(RouteType::Other(704), route.route_type);
        assert_eq!(Some(RGB8::new(0xE6, 0, 0)), route.route_color);
        assert_eq!(None, route.route_text_color);
    }
}
