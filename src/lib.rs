/*!
# Minwon — civic complaint intake

A browser-based civic-complaint intake app backed by a shared spreadsheet,
built in Rust.

## Overview

A citizen picks a location on a map, fills in a short form, and the
complaint is appended to a shared spreadsheet. Existing complaints come
back as map markers, a chronological list, an author search and a per-day
histogram. The spreadsheet is the system of record; everything in-process
is a throwaway cached projection.

## Architecture

The application follows a client-server architecture:

### Frontend Layer
- **Technologies**: HTML, Leaflet (hosted tiles)
- **Key Components**:
  - Map picker - Click to choose the complaint location
  - Submission form - Author, content, date, category, optional attachment
  - Read views - Full list, author search, daily histogram

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Record Normalizer - Turns raw sheet rows into typed complaint records
  - Submission Validator - Rejects incomplete drafts at the write boundary
  - Record Store Adapter - Google Sheets REST client (or a local CSV file)
  - Cache Wrapper - Invalidated after every write and on quota failures
  - Query Layer - Pure listing / search / histogram computations
  - Chart Renderer - PNG bar chart of the densified daily series

### Data Flow

View request -> cached fetch-all -> normalize -> query -> render.
Submission -> validate -> (optional attachment upload) -> append one row ->
invalidate cache.

## Modules

- **record**: Complaint record type, categories, row normalization
- **validate**: Submission validation and record construction
- **store**: Store trait and the invalidatable cache wrapper
- **sheets**: Google Sheets adapter
- **drive**: Google Drive attachment uploader
- **csv**: Local CSV-file store for offline use and tests
- **query**: The three read views
- **chart**: Histogram rendering
- **config**: Environment configuration (fatal when incomplete)
- **error**: Unified error taxonomy
- **app**: Routing and handlers

## REST API Endpoints

- `GET /` - The single-page UI
- `POST /api/location` - Record the clicked map point
- `GET /api/records` - Chronological listing
- `GET /api/search?author=` - Case-insensitive author substring search
- `GET /api/histogram` - Daily complaint counts as a PNG bar chart
- `POST /api/submit` - Multipart form submission
*/

// Re-export all modules so they appear in the documentation
pub mod app;
pub mod chart;
pub mod config;
pub mod csv;
pub mod drive;
pub mod error;
pub mod query;
pub mod record;
pub mod sheets;
pub mod store;
pub mod validate;

/// Re-export the core types to make the crate easier to use
pub use error::{AppError, Result, ValidationError};
pub use record::{Category, ComplaintRecord, GeoPoint};
pub use store::{CachedRecords, RecordStore};
