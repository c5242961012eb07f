//! Canned diagnostic assistant
//!
//! A deterministic template responder: picks a topic from keywords in the
//! question and formats the current snapshot into the reply. Pure function
//! of its inputs; no state is kept across calls.

use omt_core::model::BikeData;

/// Suggested prompts shown by the dashboard
pub const QUICK_QUESTIONS: [&str; 5] = [
    "Why is my engine overheating?",
    "Is it safe to ride?",
    "When should I service my bike?",
    "How to improve fuel efficiency?",
    "What does abnormal vibration mean?",
];

/// Answer a free-text question against the current snapshot
pub fn respond(question: &str, data: &BikeData) -> String {
    let q = question.to_lowercase();

    if q.contains("overheat") || q.contains("temperature") || q.contains("engine hot") {
        temperature_reply(data)
    } else if q.contains("safe to ride") || q.contains("can i ride") {
        safety_reply(data)
    } else if q.contains("service") || q.contains("maintenance") {
        service_reply(data)
    } else if q.contains("fuel") || q.contains("mileage") || q.contains("efficiency") {
        fuel_reply(data)
    } else if q.contains("vibration") {
        vibration_reply(data)
    } else {
        summary_reply(data)
    }
}

fn temperature_reply(data: &BikeData) -> String {
    if data.engine_temp > 100.0 {
        format!(
            "Engine temperature alert: currently {:.1} C, above the safe range (70-95 C).\n\n\
             Possible causes: low coolant, a faulty thermostat, prolonged high-RPM riding, \
             or clogged radiator fins.\n\n\
             Immediate steps:\n\
             - Stop riding and let the engine cool for 15-20 minutes\n\
             - Check the coolant level and top up if needed\n\
             - Inspect the radiator for blockages",
            data.engine_temp
        )
    } else {
        format!(
            "Engine temperature is {:.1} C, within the normal range (70-95 C). No \
             overheating detected. Keep monitoring during long rides or hot weather.",
            data.engine_temp
        )
    }
}

fn safety_reply(data: &BikeData) -> String {
    let mut issues = Vec::new();
    if data.engine_temp > 105.0 {
        issues.push(format!("engine temperature high ({:.1} C)", data.engine_temp));
    }
    if data.fuel_level < 10.0 {
        issues.push(format!("fuel critically low ({:.1}%)", data.fuel_level));
    }
    if data.brake_condition < 40.0 {
        issues.push(format!("brake condition poor ({:.1}%)", data.brake_condition));
    }
    if data.tire_pressure_front < 25.0 {
        issues.push(format!(
            "front tire pressure low ({:.1} PSI)",
            data.tire_pressure_front
        ));
    }
    if data.tire_pressure_rear < 25.0 {
        issues.push(format!(
            "rear tire pressure low ({:.1} PSI)",
            data.tire_pressure_rear
        ));
    }
    if data.battery_health < 30.0 {
        issues.push(format!(
            "battery health degraded ({:.0}%)",
            data.battery_health
        ));
    }
    if data.engine_vibration > 50.0 {
        issues.push(format!(
            "high engine vibration ({:.1})",
            data.engine_vibration
        ));
    }

    if issues.is_empty() {
        return format!(
            "All systems are within safe parameters. It is safe to ride.\n\n\
             - Engine: {:.1} C\n\
             - Fuel: {:.1}%\n\
             - Brakes: {:.1}%\n\
             - Tires: {:.1}/{:.1} PSI\n\
             - Battery: {:.0}%",
            data.engine_temp,
            data.fuel_level,
            data.brake_condition,
            data.tire_pressure_front,
            data.tire_pressure_rear,
            data.battery_health
        );
    }

    let listed: Vec<String> = issues.iter().map(|i| format!("- {}", i)).collect();
    format!(
        "Caution recommended before riding:\n\n{}\n\nPlease address {} before riding.",
        listed.join("\n"),
        if issues.len() > 1 {
            "these issues"
        } else {
            "this issue"
        }
    )
}

fn service_reply(data: &BikeData) -> String {
    let oil_due = data.total_distance % 3000.0 < 500.0;
    let brakes_due = data.brake_condition < 50.0;
    format!(
        "Recommended service schedule:\n\n\
         - Oil change, every 3,000 km: {}\n\
         - Brake pads, every 10,000 km: {}\n\
         - Air filter, every 5,000 km: OK\n\
         - Spark plug, every 8,000 km: OK\n\
         - Chain lube, every 500 km: OK\n\n\
         Current odometer: {:.1} km. Based on your riding pattern, schedule the \
         next service within 200 km.",
        if oil_due { "due soon" } else { "OK" },
        if brakes_due { "check needed" } else { "OK" },
        data.total_distance
    )
}

fn fuel_reply(data: &BikeData) -> String {
    let pressure_note = if data.tire_pressure_front >= 28.0 {
        "good"
    } else {
        "low, costing you mileage"
    };
    format!(
        "Fuel efficiency tips. Current fuel level: {:.1}%.\n\n\
         - Hold a steady 40-60 km/h where possible\n\
         - Avoid sudden acceleration and braking\n\
         - Keep tire pressure at recommended levels (30-32 PSI)\n\
         - Clean the air filter and tune the engine regularly\n\
         - Avoid idling for extended periods\n\
         - Use the right gear for your speed\n\n\
         Your tire pressure is {:.1}/{:.1} PSI ({}).",
        data.fuel_level, data.tire_pressure_front, data.tire_pressure_rear, pressure_note
    )
}

fn vibration_reply(data: &BikeData) -> String {
    let elevated = data.engine_vibration > 40.0;
    format!(
        "Engine vibration analysis. Current level: {:.1}, normal range 5-30. {}\n\n\
         Common causes of abnormal vibration: worn engine mounts, unbalanced wheels, \
         loose components, a worn chain or sprocket, or internal engine wear.\n\n\
         Recommendation: {}",
        data.engine_vibration,
        if elevated {
            "Elevated vibration detected."
        } else {
            "Vibration levels are normal."
        },
        if elevated {
            "Schedule a diagnostic check within the week."
        } else {
            "No action needed. Continue monitoring."
        }
    )
}

fn summary_reply(data: &BikeData) -> String {
    format!(
        "Current bike data:\n\n\
         - Speed: {:.0} km/h\n\
         - Engine temp: {:.1} C\n\
         - Fuel: {:.1}%\n\
         - Battery: {:.0}%\n\
         - Brakes: {:.1}%\n\n\
         I can help with diagnostics, maintenance advice, and troubleshooting. Try \
         \"Is it safe to ride?\" or \"Why is my engine overheating?\"",
        data.speed, data.engine_temp, data.fuel_level, data.battery_health, data.brake_condition
    )
}
