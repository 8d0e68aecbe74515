string_enum! {
    /// Secondary-market exchange a listing can be synced to
    pub enum EventExchange {
        Viagogo => "Viagogo",
        Ticketmaster => "Ticketmaster",
        Vividseats => "Vividseats",
        Seatgeek => "Seatgeek",
        Paciolan => "Paciolan",
        StubHub => "StubHub",
        Gotickets => "Gotickets",
        Tickpick => "Tickpick",
        Milb => "Milb",
        Mlb => "Mlb",
        Gametime => "Gametime",
        Playhousesquare => "Playhousesquare",
        Telecharge => "Telecharge",
        Mpv => "mpv",
        TicketNetwork => "TicketNetwork",
        Etix => "etix",
        Eventim => "eventim",
    }
}
