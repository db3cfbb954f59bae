use crate::core::ViewState;

const KML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<kml xmlns=\"http://www.opengis.net/kml/2.2\" xmlns:gx=\"http://www.google.com/kml/ext/2.2\" \
xmlns:kml=\"http://www.opengis.net/kml/2.2\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n\
<Document>\n";

const KML_FOOTER: &str = "</Document>\n</kml>\n";

/// Icon drawn at the platform position in the overview
pub const MARKER_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/airports.png";

/// Top-down document: camera 10 km above the platform plus a ground marker
///
/// Positions are written with 9 decimals, everything else with 6.
pub fn render_overview(view: &ViewState, marker_name: &str) -> String {
    let mut doc = String::from(KML_HEADER);

    doc.push_str(&format!(
        "\t<Camera>\n\
         \t\t<longitude>{lon:.9}</longitude>\n\
         \t\t<latitude>{lat:.9}</latitude>\n\
         \t\t<altitude>{alt:.6}</altitude>\n\
         \t\t<heading>{heading:.6}</heading>\n\
         \t\t<tilt>0</tilt>\n\
         \t\t<altitudeMode>absolute</altitudeMode>\n\
         \t</Camera>\n",
        lon = view.longitude_deg,
        lat = view.latitude_deg,
        alt = view.overview_altitude_m(),
        heading = view.heading_deg,
    ));

    doc.push_str(&format!(
        "\t<Style id=\"sn_airports\">\n\
         \t\t<IconStyle>\n\
         \t\t\t<scale>1.4</scale>\n\
         \t\t\t<heading>{heading:.6}</heading>\n\
         \t\t\t<Icon>\n\
         \t\t\t\t<href>{icon}</href>\n\
         \t\t\t</Icon>\n\
         \t\t\t<hotSpot x=\"0.5\" y=\"0\" xunits=\"fraction\" yunits=\"fraction\"/>\n\
         \t\t</IconStyle>\n\
         \t\t<ListStyle>\n\
         \t\t</ListStyle>\n\
         \t</Style>\n\
         \t<StyleMap id=\"msn_airports\">\n\
         \t\t<Pair>\n\
         \t\t\t<key>normal</key>\n\
         \t\t\t<styleUrl>#sn_airports</styleUrl>\n\
         \t\t</Pair>\n\
         \t\t<Pair>\n\
         \t\t\t<key>highlight</key>\n\
         \t\t\t<styleUrl>#sn_airports</styleUrl>\n\
         \t\t</Pair>\n\
         \t</StyleMap>\n",
        heading = view.heading_deg,
        icon = MARKER_ICON,
    ));

    doc.push_str(&format!(
        "\t<Placemark>\n\
         \t\t<name>{name}</name>\n\
         \t\t<styleUrl>#msn_airports</styleUrl>\n\
         \t\t<Point>\n\
         \t\t\t<altitudeMode>clampToGround</altitudeMode>\n\
         \t\t\t<coordinates>{lon:.9},{lat:.9}</coordinates>\n\
         \t\t</Point>\n\
         \t</Placemark>\n",
        name = escape(marker_name),
        lon = view.longitude_deg,
        lat = view.latitude_deg,
    ));

    doc.push_str(KML_FOOTER);
    doc
}

/// Pilot-eye document: camera at the platform with its roll and tilt
pub fn render_perspective(view: &ViewState) -> String {
    let mut doc = String::from(KML_HEADER);

    doc.push_str(&format!(
        "\t<Camera>\n\
         \t\t<longitude>{lon:.9}</longitude>\n\
         \t\t<latitude>{lat:.9}</latitude>\n\
         \t\t<altitude>{alt:.6}</altitude>\n\
         \t\t<roll>{roll:.6}</roll>\n\
         \t\t<tilt>{tilt:.6}</tilt>\n\
         \t\t<heading>{heading:.6}</heading>\n\
         \t\t<altitudeMode>absolute</altitudeMode>\n\
         \t</Camera>\n",
        lon = view.longitude_deg,
        lat = view.latitude_deg,
        alt = view.altitude_m,
        roll = view.roll_deg,
        tilt = view.tilt_deg,
        heading = view.heading_deg,
    ));

    doc.push_str(KML_FOOTER);
    doc
}

/// Escape text for use as XML character data
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Pull the text of the first `<tag>` element out of a document
#[cfg(test)]
pub(crate) fn element<'a>(doc: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = doc.find(&open)? + open.len();
    let end = start + doc[start..].find(&close)?;
    Some(&doc[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState {
            longitude_deg: -76.123456789123,
            latitude_deg: 36.5,
            altitude_m: 152.25,
            heading_deg: -12.5,
            roll_deg: -5.729578,
            tilt_deg: 90.0,
        }
    }

    #[test]
    fn test_overview_camera() {
        let doc = render_overview(&view(), "CFBCN");
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<kml "));
        assert!(doc.ends_with("</Document>\n</kml>\n"));

        assert_eq!(element(&doc, "longitude"), Some("-76.123456789"));
        assert_eq!(element(&doc, "latitude"), Some("36.500000000"));
        assert_eq!(element(&doc, "altitude"), Some("10152.250000"));
        assert_eq!(element(&doc, "heading"), Some("-12.500000"));
        assert_eq!(element(&doc, "tilt"), Some("0"));
        assert!(element(&doc, "roll").is_none());
    }

    #[test]
    fn test_overview_marker() {
        let doc = render_overview(&view(), "N42 <test> & co");
        assert_eq!(element(&doc, "name"), Some("N42 &lt;test&gt; &amp; co"));
        assert_eq!(element(&doc, "coordinates"), Some("-76.123456789,36.500000000"));
        assert!(doc.contains(MARKER_ICON));
        assert!(doc.contains("<altitudeMode>clampToGround</altitudeMode>"));
    }

    #[test]
    fn test_perspective_camera() {
        let doc = render_perspective(&view());
        assert_eq!(element(&doc, "altitude"), Some("152.250000"));
        assert_eq!(element(&doc, "roll"), Some("-5.729578"));
        assert_eq!(element(&doc, "tilt"), Some("90.000000"));
        assert_eq!(element(&doc, "heading"), Some("-12.500000"));
        assert!(!doc.contains("Placemark"));
    }
}
