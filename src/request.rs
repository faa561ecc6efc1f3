//! Graph request parameters.
//!
//! Front ends ask for a random graph with a URL query string such as
//! `nodeQuantity=40&nodeConnectivity=0.1&callback=onGraph`. An optional
//! `x`, `y`, `w`, `h` quadruple restricts the answer to a region of the frame.

use std::str::FromStr;

use crate::document::LocalCoordinateInformation;
use crate::error::{GraphError, Result};
use crate::generator::RandomGraphGenerator;

/// Node count used when a request does not name one.
pub const DEFAULT_NODE_QUANTITY: usize = 12;

/// Edge probability used when a request does not name one.
pub const DEFAULT_NODE_CONNECTIVITY: f64 = 0.25;

/// A parsed graph request.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub node_quantity: usize,
    pub node_connectivity: f64,
    /// JSONP callback name; the response is wrapped as `callback(...)`.
    pub callback: Option<String>,
    pub region: Option<LocalCoordinateInformation>,
}

impl Default for GraphRequest {
    fn default() -> Self {
        Self {
            node_quantity: DEFAULT_NODE_QUANTITY,
            node_connectivity: DEFAULT_NODE_CONNECTIVITY,
            callback: None,
            region: None,
        }
    }
}

impl GraphRequest {
    /// Parse a URL query string. A leading `?` is ignored, as are unknown keys.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut request = Self::default();
        let mut region: [Option<f64>; 4] = [None; 4];

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "nodeQuantity" => request.node_quantity = parse_number("nodeQuantity", &value)?,
                "nodeConnectivity" => {
                    request.node_connectivity = parse_number("nodeConnectivity", &value)?
                }
                "callback" => request.callback = parse_callback(&value)?,
                "x" => region[0] = Some(parse_number("x", &value)?),
                "y" => region[1] = Some(parse_number("y", &value)?),
                "w" => region[2] = Some(parse_number("w", &value)?),
                "h" => region[3] = Some(parse_number("h", &value)?),
                _ => {}
            }
        }

        request.region = parse_region(region)?;
        Ok(request)
    }

    /// Generate the requested graph and render the response body.
    pub fn respond(&self, generator: &mut RandomGraphGenerator) -> Result<String> {
        let mut document = generator.generate(self.node_quantity, self.node_connectivity)?;
        if let Some(region) = self.region {
            document = document.with_local_region(region)?;
        }
        document.to_jsonp(self.callback.as_deref())
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GraphError::invalid(name, format!("cannot parse {value:?}")))
}

fn parse_callback(value: &str) -> Result<Option<String>> {
    if value.is_empty() {
        return Ok(None);
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if !valid {
        return Err(GraphError::invalid(
            "callback",
            format!("{value:?} is not a JavaScript identifier path"),
        ));
    }
    Ok(Some(value.to_string()))
}

fn parse_region(parts: [Option<f64>; 4]) -> Result<Option<LocalCoordinateInformation>> {
    const NAMES: [&str; 4] = ["x", "y", "w", "h"];

    match parts {
        [None, None, None, None] => Ok(None),
        [Some(x), Some(y), Some(w), Some(h)] => {
            if !(w.is_finite() && w > 0.0) {
                return Err(GraphError::invalid("w", format!("must be positive, got {w}")));
            }
            if !(h.is_finite() && h > 0.0) {
                return Err(GraphError::invalid("h", format!("must be positive, got {h}")));
            }
            Ok(Some(LocalCoordinateInformation::new([x, y], w, h)))
        }
        _ => {
            let missing = parts
                .iter()
                .zip(NAMES)
                .find_map(|(part, name)| part.is_none().then_some(name))
                .unwrap_or("x");
            Err(GraphError::invalid(
                missing,
                "a region needs all of x, y, w and h",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::GraphDocument;

    #[test]
    fn test_defaults() {
        let request = GraphRequest::from_query("").unwrap();
        assert_eq!(request, GraphRequest::default());
        assert_eq!(request.node_quantity, 12);
        assert_eq!(request.node_connectivity, 0.25);
    }

    #[test]
    fn test_parse_all_fields() {
        let request =
            GraphRequest::from_query("?nodeQuantity=40&nodeConnectivity=0.1&callback=app.onGraph")
                .unwrap();
        assert_eq!(request.node_quantity, 40);
        assert_eq!(request.node_connectivity, 0.1);
        assert_eq!(request.callback.as_deref(), Some("app.onGraph"));
        assert_eq!(request.region, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let request = GraphRequest::from_query("graphId=3&nodeQuantity=5").unwrap();
        assert_eq!(request.node_quantity, 5);
    }

    #[test]
    fn test_unparseable_values() {
        let err = GraphRequest::from_query("nodeQuantity=lots").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "nodeQuantity", .. }));

        let err = GraphRequest::from_query("nodeQuantity=-4").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "nodeQuantity", .. }));

        let err = GraphRequest::from_query("nodeConnectivity=half").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "nodeConnectivity", .. }));
    }

    #[test]
    fn test_callback_must_be_identifier() {
        let err = GraphRequest::from_query("callback=alert(1)").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "callback", .. }));

        let request = GraphRequest::from_query("callback=").unwrap();
        assert_eq!(request.callback, None);
    }

    #[test]
    fn test_region() {
        let request = GraphRequest::from_query("x=0&y=0&w=512&h=256").unwrap();
        assert_eq!(
            request.region,
            Some(LocalCoordinateInformation::new([0.0, 0.0], 512.0, 256.0))
        );
    }

    #[test]
    fn test_partial_region_is_rejected() {
        let err = GraphRequest::from_query("x=0&y=0&w=512").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "h", .. }));
    }

    #[test]
    fn test_non_positive_region_is_rejected() {
        let err = GraphRequest::from_query("x=0&y=0&w=0&h=10").unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "w", .. }));
    }

    #[test]
    fn test_respond_plain_json() {
        let request = GraphRequest::from_query("nodeQuantity=6&nodeConnectivity=1").unwrap();
        let mut generator = RandomGraphGenerator::new(4);
        let body = request.respond(&mut generator).unwrap();

        let doc = GraphDocument::from_json(&body).unwrap();
        assert_eq!(doc.node_count(), 6);
        assert_eq!(doc.edge_count(), 15);
    }

    #[test]
    fn test_respond_jsonp() {
        let request = GraphRequest::from_query("nodeQuantity=3&callback=onGraph").unwrap();
        let mut generator = RandomGraphGenerator::new(4);
        let body = request.respond(&mut generator).unwrap();

        assert!(body.starts_with("onGraph({"));
        assert!(body.ends_with("})"));
        let inner = &body["onGraph(".len()..body.len() - 1];
        assert_eq!(GraphDocument::from_json(inner).unwrap().node_count(), 3);
    }

    #[test]
    fn test_respond_with_region() {
        let request =
            GraphRequest::from_query("nodeQuantity=30&nodeConnectivity=0.3&x=0&y=0&w=512&h=512")
                .unwrap();
        let mut generator = RandomGraphGenerator::new(10);
        let doc = GraphDocument::from_json(&request.respond(&mut generator).unwrap()).unwrap();

        assert_eq!(doc.local_coordinate_information.width, 512.0);
        assert_eq!(doc.global_coordinate_information.width, 1024.0);
        for node in &doc.nodes {
            assert!(node.coordinate[0] <= 512.0 && node.coordinate[1] <= 512.0);
        }
    }

    #[test]
    fn test_respond_propagates_invalid_count() {
        let request = GraphRequest::from_query("nodeQuantity=0").unwrap();
        let mut generator = RandomGraphGenerator::new(0);
        assert!(matches!(
            request.respond(&mut generator),
            Err(GraphError::InvalidParameter { name: "nodeCount", .. })
        ));
    }
}
