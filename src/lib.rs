/*!
# Tessera

Membership check-in for a surf club, backed by a Google spreadsheet.

## Overview

A volunteer at the entrance types the member's card identifier. The server
finds the member's row in the club spreadsheet, adds one to the visit
counter stored in that row and shows whether the visitor is a member, which
card they hold and how many times they have already entered.

## Architecture

### Pages
- **Index** - identifier entry form
- **Result** - verification outcome, with a warning for repeated entries
- **Login** - shared-password form

### Backend
- **Session gate** - every route except the login ones requires the
  `auth-session` cookie
- **Lookup handler** - header read, column resolution, row scan and counter
  write-back
- **Sheets adapter** - Google Sheets v4 REST calls signed with a service
  account

### Storage
There is no local storage. Every request reads the sheet again, so columns
can be moved or renamed between requests as long as their labels still
contain `uuid`, `ingressi` and `tipo tes`.

## Modules

- **columns**: header resolution and A1 addressing
- **config**: environment configuration
- **error**: error types
- **service_account**: OAuth tokens for the service account
- **sheets**: spreadsheet client trait and Google implementation
- **verify**: membership lookup and visit counting
- **login**: login/logout endpoints and the session gate (`web` feature)
- **pages**: rendered pages (`web` feature)
- **app**: routing and server start (`web` feature)

## REST API Endpoints

- `GET /api/verify-subscription?ID=...` - Verifies a member and counts the visit
- `POST /api/auth/login` - Opens a session
- `POST /api/auth/logout` - Closes the session

## Known gaps

The counter update is a plain read-modify-write. Two simultaneous check-ins
of the same member can record a single visit.
*/

pub mod columns;
pub mod config;
pub mod error;
pub mod service_account;
pub mod sheets;
pub mod verify;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod login;
#[cfg(feature = "web")]
pub mod pages;

/// Re-export the commonly used types
pub use columns::{CellRange, Column, ColumnMap, resolve_columns};
pub use config::Config;
pub use error::{SheetError, VerifyError};
pub use sheets::{GoogleSheets, SheetClient};
pub use verify::{Verdict, verify_member};
