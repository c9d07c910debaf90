mod messages;
mod table;
