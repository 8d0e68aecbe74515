/*!
# Availability Snapshots

Per-source availability records read from and written to the availability
cache. Only Ticketmaster snapshots are cached in positional form today.
*/

pub mod ticketmaster;
