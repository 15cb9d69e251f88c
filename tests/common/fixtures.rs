//! Listing and document fixtures in the shape the gd2 server renders them

/// Day folder index: parent link, game folders, then non-game files
pub fn day_index(games: &[&str]) -> String {
    let mut html = String::from(
        "<html>\n<head>\n<title>Index of /components/game/mlb/year_2008/month_04/day_01</title>\n</head>\n\
         <body>\n<h1>Index of /components/game/mlb/year_2008/month_04/day_01</h1>\n<ul>\n\
         <li><a href=\"/components/game/mlb/year_2008/month_04/\"> Parent Directory</a></li>\n",
    );
    for game in games {
        html.push_str(&format!("<li><a href=\"{game}/\"> {game}/</a></li>\n"));
    }
    html.push_str("<li><a href=\"epg.xml\"> epg.xml</a></li>\n");
    html.push_str("<li><a href=\"scoreboard.xml\"> scoreboard.xml</a></li>\n");
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

/// Pitchers/batters folder index with one `<id>.xml` entry per id
pub fn entity_index(ids: &[u64]) -> String {
    let mut html = String::from(
        "<html>\n<body>\n<ul>\n<li><a href=\"../\"> Parent Directory</a></li>\n",
    );
    for id in ids {
        html.push_str(&format!("<li><a href=\"{id}.xml\"> {id}.xml</a></li>\n"));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

pub fn inning_all(game: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<game atBat=\"{game}\">\n\
         <inning num=\"1\" away_team=\"bos\" home_team=\"oak\"/>\n</game>\n"
    )
}

pub fn player(id: u64) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Player id=\"{id}\" team=\"bos\"/>\n")
}
