use std::borrow::Cow;

use crate::dashboard::Dashboard;
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type,
            body: body.into(),
        }
    }

    fn json(body: String) -> Self {
        Self::ok("application/json", body)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn to_http_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

pub fn route_request(dashboard: &Dashboard, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    log::debug!("(route_request) {method} {route}");

    match (method, route) {
        ("GET", "/") => HttpResponse::ok("text/html; charset=utf-8", index_html()),
        ("GET", "/api/health") => match api::health_payload(dashboard) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/factions") => match api::factions_payload(dashboard) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/units") => lookup_response(api::units_payload(dashboard, path)),
        ("GET", route) if route.starts_with("/api/units/") => {
            let raw = route.trim_start_matches("/api/units/");
            match api::decode_component(raw) {
                Some(name) => lookup_response(api::unit_payload(dashboard, &name)),
                None => error_response(400, "Bad Request", "Invalid unit name encoding"),
            }
        }
        ("GET", "/api/keywords") => match api::keywords_payload(dashboard, path) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", route) if route.starts_with("/api/images/") => {
            let rest = route.trim_start_matches("/api/images/");
            let Some((raw_unit, page)) = rest.rsplit_once('/') else {
                return error_response(404, "Not Found", "Expected /api/images/<unit>/<page>");
            };
            let Some(unit) = api::decode_component(raw_unit) else {
                return error_response(400, "Bad Request", "Invalid unit name encoding");
            };
            match api::image_payload(dashboard, &unit, page) {
                Ok(image) => HttpResponse::ok(image.content_type, image.bytes),
                Err(err) => lookup_error_response(err),
            }
        }
        ("POST", "/api/calc") => calc_response(api::calc_payload(dashboard, body)),
        ("POST", "/api/calc/unit") => calc_response(api::unit_calc_payload(dashboard, body)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn lookup_response(result: Result<String, api::LookupError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => lookup_error_response(err),
    }
}

fn lookup_error_response(err: api::LookupError) -> HttpResponse {
    match err {
        api::LookupError::MissingParam(_) => {
            error_response(400, "Bad Request", &err.to_string())
        }
        api::LookupError::NotFound(_) => error_response(404, "Not Found", &err.to_string()),
        api::LookupError::Image(_) | api::LookupError::Serialize(_) => {
            log::error!("(route_request) {err}");
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

fn calc_response(result: Result<String, api::CalcPayloadError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(api::CalcPayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        Err(api::CalcPayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(err @ api::CalcPayloadError::UnknownUnit(_)) => {
            error_response(404, "Not Found", &err.to_string())
        }
        Err(err @ api::CalcPayloadError::Serialize(_)) => {
            log::error!("(calc_response) {err}");
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload)
            .unwrap_or(fallback)
            .into_bytes(),
    }
}

pub(crate) fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        )
        .into_bytes(),
    }
}

fn index_html() -> &'static str {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Datasheets</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; display: grid; grid-template-columns: 260px 300px 1fr; gap: 16px; }
    aside, section { padding: 12px; }
    aside { background: #f4f4f4; min-height: 100vh; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    select, input { width: 100%; padding: 6px; box-sizing: border-box; }
    .check { font-weight: normal; }
    .check input { width: auto; }
    details { border: 1px solid #ddd; border-radius: 8px; padding: 10px; margin: 10px 0; }
    summary { font-weight: 700; cursor: pointer; }
    table { border-collapse: collapse; margin: 6px 0; }
    td, th { border: 1px solid #ccc; padding: 3px 8px; text-align: right; }
    img { max-width: 100%; }
    .err { color: #a00; }
  </style>
</head>
<body>
  <aside>
    <h3>Options</h3>
    <label for="faction">Select Faction</label>
    <select id="faction"></select>
    <label class="check"><input type="checkbox" id="show-image" checked /> Show datasheet as image</label>
    <label class="check"><input type="checkbox" id="show-table" /> Show datasheet as text</label>
    <label class="check"><input type="checkbox" id="show-page-two" /> Show second page</label>
    <label class="check"><input type="checkbox" id="show-calc" /> Show damage calc</label>
    <label for="save-roll">Assumed save roll</label>
    <input id="save-roll" type="number" min="2" max="6" step="1" value="3" />
    <label for="hit-mod">Hit modifier</label>
    <select id="hit-mod"><option value="-1">-1</option><option value="0" selected>0</option><option value="1">+1</option></select>
    <label for="glossary">Keyword definitions</label>
    <select id="glossary" multiple size="6"></select>
    <div id="glossary-out"></div>
  </aside>
  <section>
    <h1 id="faction-title"></h1>
    <label for="units">Units</label>
    <select id="units" multiple size="10"></select>
    <h3>Keywords</h3>
    <div id="keywords"></div>
  </section>
  <section id="main"></section>

  <script>
    const $ = (id) => document.getElementById(id);
    const enc = encodeURIComponent;
    let glossary = [];

    async function getJson(url, options) {
      const response = await fetch(url, options);
      return response.json();
    }

    function selected(el) {
      return Array.from(el.selectedOptions).map(o => o.value);
    }

    function fill(el, values) {
      el.innerHTML = '';
      values.forEach(v => { const o = document.createElement('option'); o.value = v; o.textContent = v; el.appendChild(o); });
    }

    function hitsTable(hits) {
      const keys = Object.keys(hits);
      return '<table><tr>' + keys.map(k => '<th>' + k + '</th>').join('') + '</tr><tr>' +
        keys.map(k => '<td>' + hits[k].toFixed(2) + '</td>').join('') + '</tr></table>';
    }

    async function loadFactions() {
      const data = await getJson('/api/factions');
      fill($('faction'), data.factions);
      const kw = await getJson('/api/keywords');
      glossary = kw.keywords;
      fill($('glossary'), glossary.map(k => k.name));
      await loadUnits();
    }

    async function loadUnits() {
      const faction = $('faction').value;
      $('faction-title').textContent = faction.charAt(0).toUpperCase() + faction.slice(1);
      const data = await getJson('/api/units?faction=' + enc(faction));
      fill($('units'), data.units);
      await render();
    }

    function renderGlossary() {
      const names = selected($('glossary'));
      $('glossary-out').innerHTML = glossary.filter(k => names.includes(k.name))
        .map(k => '<p><strong>' + k.name + '</strong><br/>' + k.description + '</p>').join('');
    }

    async function render() {
      const units = selected($('units'));
      const kw = await getJson('/api/keywords?units=' + enc(units.join(',')));
      $('keywords').innerHTML = kw.keywords.map(k => '<p><strong>' + k.name + '</strong><br/>' + k.description + '</p>').join('');

      const main = $('main');
      main.innerHTML = '';
      for (const name of units) {
        const unit = await getJson('/api/units/' + enc(name));
        const panel = document.createElement('details');
        panel.open = true;
        let html = '<summary>' + name + '</summary>';
        if ($('show-image').checked) {
          if (unit.images.includes(1)) html += '<img src="/api/images/' + enc(name) + '/1" />';
          if ($('show-page-two').checked && unit.images.includes(2)) html += '<img src="/api/images/' + enc(name) + '/2" />';
        }
        if ($('show-table').checked) {
          const sheet = unit.datasheet;
          html += '<table><tr>' + sheet.numeric.map(s => '<th>' + s.label + '</th>').join('') + '</tr><tr>' +
            sheet.numeric.map(s => '<td>' + s.value + '</td>').join('') + '</tr></table>';
          html += sheet.text.map(s => '<p><strong>' + s.label + '</strong><br/>' + s.value + '</p>').join('');
        }
        if ($('show-calc').checked) {
          const calc = await getJson('/api/calc/unit', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ unit: name, save_roll: Number($('save-roll').value), hit_modifier: Number($('hit-mod').value) }),
          });
          (calc.weapons || []).forEach(w => {
            html += '<p><strong>' + w.weapon + '</strong> (A ' + w.attacks + ', BS ' + w.ballistic_skill + ')</p>';
            html += w.expected_hits ? hitsTable(w.expected_hits) : '<p class="err">' + w.error + '</p>';
          });
        }
        panel.innerHTML = html;
        main.appendChild(panel);
      }
    }

    $('faction').addEventListener('change', loadUnits);
    $('glossary').addEventListener('change', renderGlossary);
    ['units', 'show-image', 'show-table', 'show-page-two', 'show-calc', 'save-roll', 'hit-mod']
      .forEach(id => $(id).addEventListener('change', render));
    loadFactions();
  </script>
</body>
</html>
"#
}
