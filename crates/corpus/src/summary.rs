use crate::PlayerRecord;

/// Render one record through the fixed summary template.
///
/// Pure function of the record: the same record always yields the same bytes.
/// Decimal fields are rendered exactly as they appeared in the table.
pub fn render_summary(r: &PlayerRecord) -> String {
    format!(
        "{player} played for the {team} in {year} as a {role}.\n\
         He played {matches} matches and batted in {innings} innings with {not_out} not out(s).\n\
         He scored a total of {runs} runs, with a highest score of {highest} and an average of {average}.\n\
         He faced {balls} balls with a strike rate of {strike_rate}.\n\
         He hit {fours} fours and {sixes} sixes, including {centuries} centuries and {fifties} half-centuries.",
        player = r.player,
        team = r.team,
        year = r.year,
        role = r.role,
        matches = r.matches,
        innings = r.innings,
        not_out = r.not_out,
        runs = r.runs,
        highest = r.highest_score,
        average = r.average,
        balls = r.balls_faced,
        strike_rate = r.strike_rate,
        fours = r.fours,
        sixes = r.sixes,
        centuries = r.centuries,
        fifties = r.half_centuries,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlayerRecord {
        PlayerRecord {
            player: "KL Rahul".into(),
            team: "LSG".into(),
            year: 2022,
            role: "Batsman".into(),
            matches: 15,
            innings: 15,
            not_out: 3,
            runs: 616,
            highest_score: "103*".into(),
            average: "51.33".into(),
            balls_faced: 455,
            strike_rate: "135.38".into(),
            fours: 45,
            sixes: 30,
            centuries: 2,
            half_centuries: 4,
        }
    }

    #[test]
    fn renders_five_lines() {
        let text = render_summary(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "KL Rahul played for the LSG in 2022 as a Batsman.");
        assert_eq!(
            lines[2],
            "He scored a total of 616 runs, with a highest score of 103* and an average of 51.33."
        );
        assert!(!text.starts_with('\n'));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rec = sample();
        assert_eq!(render_summary(&rec), render_summary(&rec.clone()));
    }

    #[test]
    fn decimals_render_verbatim() {
        let mut rec = sample();
        rec.average = "44.0".into();
        rec.strike_rate = "140.50".into();
        let text = render_summary(&rec);
        assert!(text.contains("an average of 44.0."));
        assert!(text.contains("a strike rate of 140.50."));
    }
}
