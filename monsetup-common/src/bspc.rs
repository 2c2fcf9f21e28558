/// Splits `bspc query -D` output into desktop ids, keeping bspwm's order.
pub fn parse_desktop_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
