use super::{Board, BoardBuilder};
use crate::NumArmies;

const CONTINENTS: [(&str, NumArmies); 6] = [
    ("africa", 3),
    ("asia", 7),
    ("australia", 2),
    ("europe", 5),
    ("north_america", 5),
    ("south_america", 2),
];

// (territory, continent, neighbours); each edge may be listed from either end
const TERRITORIES: [(&str, &str, &[&str]); 42] = [
    ("central_africa", "africa", &["east_africa", "north_africa", "south_africa"]),
    ("east_africa", "africa", &["central_africa", "egypt", "madagascar", "north_africa", "middle_east"]),
    ("egypt", "africa", &["east_africa", "north_africa", "southern_europe"]),
    ("madagascar", "africa", &["east_africa", "south_africa"]),
    ("north_africa", "africa", &["central_africa", "east_africa", "egypt", "southern_europe", "western_europe", "brazil"]),
    ("south_africa", "africa", &["central_africa", "east_africa", "madagascar"]),

    ("afghanistan", "asia", &["china", "india", "middle_east", "ural", "russia"]),
    ("china", "asia", &["afghanistan", "india", "mongolia", "southern_asia", "siberia", "ural"]),
    ("india", "asia", &["afghanistan", "china", "middle_east", "southern_asia"]),
    ("irkutsk", "asia", &["kamchatka", "mongolia", "siberia", "yakutsk"]),
    ("japan", "asia", &["kamchatka", "mongolia"]),
    ("kamchatka", "asia", &["irkutsk", "japan", "yakutsk", "alaska"]),
    ("middle_east", "asia", &["east_africa", "egypt", "afghanistan", "india", "southern_europe", "russia"]),
    ("mongolia", "asia", &["china", "irkutsk", "japan", "kamchatka", "siberia"]),
    ("southern_asia", "asia", &["china", "india", "indonesia"]),
    ("siberia", "asia", &["china", "irkutsk", "mongolia", "ural", "yakutsk"]),
    ("ural", "asia", &["afghanistan", "china", "siberia", "russia"]),
    ("yakutsk", "asia", &["irkutsk", "kamchatka", "siberia"]),

    ("eastern_australia", "australia", &["new_guinea", "western_australia"]),
    ("indonesia", "australia", &["southern_asia", "new_guinea", "western_australia"]),
    ("new_guinea", "australia", &["eastern_australia", "indonesia", "western_australia"]),
    ("western_australia", "australia", &["eastern_australia", "indonesia", "new_guinea"]),

    ("great_britain", "europe", &["iceland", "northern_europe", "scandinavia", "western_europe"]),
    ("iceland", "europe", &["great_britain", "scandinavia", "greenland"]),
    ("northern_europe", "europe", &["great_britain", "scandinavia", "southern_europe", "russia", "western_europe"]),
    ("scandinavia", "europe", &["great_britain", "iceland", "northern_europe", "russia"]),
    ("southern_europe", "europe", &["egypt", "north_africa", "middle_east", "northern_europe", "russia", "western_europe"]),
    ("russia", "europe", &["afghanistan", "middle_east", "ural", "northern_europe", "scandinavia", "southern_europe"]),
    ("western_europe", "europe", &["north_africa", "great_britain", "northern_europe", "southern_europe"]),

    ("alaska", "north_america", &["kamchatka", "alberta", "northwest_territory"]),
    ("alberta", "north_america", &["alaska", "northwest_territory", "ontario", "western_united_states"]),
    ("central_america", "north_america", &["eastern_united_states", "western_united_states", "venezuela"]),
    ("eastern_united_states", "north_america", &["central_america", "ontario", "eastern_canada", "western_united_states"]),
    ("greenland", "north_america", &["iceland", "northwest_territory", "ontario", "eastern_canada"]),
    ("northwest_territory", "north_america", &["alaska", "alberta", "greenland", "ontario"]),
    ("ontario", "north_america", &["alberta", "eastern_united_states", "greenland", "northwest_territory", "eastern_canada", "western_united_states"]),
    ("eastern_canada", "north_america", &["eastern_united_states", "greenland", "ontario"]),
    ("western_united_states", "north_america", &["alberta", "central_america", "eastern_united_states", "ontario"]),

    ("argentina", "south_america", &["brazil", "peru"]),
    ("brazil", "south_america", &["north_africa", "argentina", "peru", "venezuela"]),
    ("peru", "south_america", &["argentina", "brazil", "venezuela"]),
    ("venezuela", "south_america", &["central_america", "brazil", "peru"]),
];

const MINI_CONTINENTS: [(&str, NumArmies); 2] = [("north", 3), ("south", 2)];

// a ring: alpha - bravo - charlie - delta - echo - foxtrot - alpha
const MINI_TERRITORIES: [(&str, &str, &[&str]); 6] = [
    ("alpha", "north", &["bravo", "foxtrot"]),
    ("bravo", "north", &["alpha", "charlie"]),
    ("charlie", "north", &["bravo", "delta"]),
    ("delta", "south", &["charlie", "echo"]),
    ("echo", "south", &["delta", "foxtrot"]),
    ("foxtrot", "south", &["echo", "alpha"]),
];

fn build(continents: &[(&str, NumArmies)], territories: &[(&str, &str, &[&str])]) -> Board {
    let mut builder = BoardBuilder::new();
    for &(name, bonus) in continents {
        builder.continent(name, bonus);
    }
    for &(name, continent, _) in territories {
        builder.territory(name, continent);
    }
    for &(name, _, neighbours) in territories {
        for neighbour in neighbours {
            builder.connect(name, neighbour);
        }
    }
    match builder.build() {
        Ok(board) => board,
        Err(e) => panic!("built-in board table is malformed: {}", e),
    }
}

pub(super) fn standard_board() -> Board {
    build(&CONTINENTS, &TERRITORIES)
}

pub(super) fn mini_board() -> Board {
    build(&MINI_CONTINENTS, &MINI_TERRITORIES)
}
