//! Plain-language rendering of lookup results.

use crate::lookup::LookupResult;

/// Renders a result the way the command line prints it, e.g.
/// `This location is found in the 50.0% credibility region of the map.`
pub fn sentence(result: &LookupResult) -> String {
    let credibility = number(result.credibility);

    let mut text = match result.time_delta {
        None => format!(
            "This location is found in the {}% credibility region of the map.",
            credibility
        ),
        Some(delta) => format!(
            "This transient is found in the {}% credibility region, and occurred {} days {} the map event.",
            credibility,
            number(delta.abs()),
            if delta < 0.0 { "before" } else { "after" }
        ),
    };

    if let Some(distance) = &result.distance {
        match (distance.mean, distance.std) {
            (Some(mean), Some(std)) => {
                text.push_str(&format!(
                    " It lies at a distance of {} ± {} Mpc.",
                    number(mean),
                    number(std)
                ));
            }
            _ => text.push_str(" The map has no distance localisation for this position."),
        }
    }

    if let Some(density) = result.probability_density {
        text.push_str(&format!(
            " The probability density at this position is {} per steradian.",
            number(density)
        ));
    }

    text
}

/// Shortest round-trip form, keeping one decimal for whole numbers.
fn number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
