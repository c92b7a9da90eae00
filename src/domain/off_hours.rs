// Messages shown instead of the short-window chart while the boiler is idle

pub const DAY_START_HOUR: u32 = 8;
pub const NIGHT_START_HOUR: u32 = 18;

pub const NIGHT: &str = "
The boiler has gone quiet for the night. No heating power was measured in the
recent window, so the burner is resting and the house is coasting on whatever
warmth the radiators stored during the day.

Nothing to chart until the fire is lit again. Good night. 🦉
";

pub const DAY: &str = "
The boiler is taking a break. No heating power was measured in the recent
window, and the rooms are living off the heat already in the walls and water.

The chart comes back as soon as the burner does. 🦉
";

pub fn message_for_hour(hour: u32) -> &'static str {
    if (DAY_START_HOUR..NIGHT_START_HOUR).contains(&hour) {
        DAY
    } else {
        NIGHT
    }
}
